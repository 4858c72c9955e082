use std::collections::BTreeMap;

use academia_core::{AppError, FieldError};
use academia_models::Normalize;
use academia_models::validation::FIELD_PARAM;
use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// One entry per failing field, using the first message reported for it.
///
/// Struct-level errors are reported under the field named by their
/// [`FIELD_PARAM`] parameter.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for (field, errors) in errors.field_errors() {
        for error in errors.iter() {
            let name = error
                .params
                .get(FIELD_PARAM)
                .and_then(|value| value.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| field.to_string());
            let message = error
                .message
                .as_ref()
                .map(|msg| msg.to_string())
                .unwrap_or_else(|| format!("{name} is invalid"));
            fields.entry(name).or_insert(message);
        }
    }
    fields
        .into_iter()
        .map(|(field, message)| FieldError::new(field, message))
        .collect()
}

/// JSON body that is normalized and then validated.
///
/// Rejections are `400`s; validation failures name the offending fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Normalize,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    ));
                }

                let error_msg = rejection.body_text();
                if let Some(field) = error_msg
                    .split("missing field `")
                    .nth(1)
                    .and_then(|s| s.split('`').next())
                {
                    return AppError::field(field, format!("{field} is required"));
                }

                if error_msg.contains("invalid type") {
                    return AppError::bad_request(anyhow!("Invalid field type in request"));
                }

                AppError::bad_request(anyhow!("Invalid request body"))
            })?;

        value.normalize();
        value
            .validate()
            .map_err(|errors| AppError::validation(field_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academia_models::auth::PasswordResetConfirmRequest;
    use academia_models::users::NewUser;

    #[test]
    fn test_field_errors_use_validator_messages() {
        let dto = PasswordResetConfirmRequest {
            uid: String::new(),
            token: "GE-sig".to_string(),
            password: "Str0ng!pass".to_string(),
            password_confirm: "different".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        let fields = field_errors(&errors);

        assert_eq!(
            fields,
            vec![
                FieldError::new("password_confirm", "passwords do not match"),
                FieldError::new("uid", "uid is required"),
            ]
        );
    }

    #[test]
    fn test_struct_level_errors_name_their_field() {
        let dto = NewUser {
            name: "Jane Doe".to_string(),
            username: Some("jane_doe".to_string()),
            email: None,
            password: "jane_Doe1!".to_string(),
            password_confirm: "jane_Doe1!".to_string(),
            roles: vec![],
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            field_errors(&errors),
            vec![FieldError::new(
                "password",
                "password cannot be similar to user attributes"
            )]
        );
    }
}
