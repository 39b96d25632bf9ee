// src/i18n.rs

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Response language, picked from the `Accept-Language` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Only the first language tag is considered; anything but Spanish falls back to English.
    pub fn from_accept_language(value: &str) -> Self {
        let primary = value
            .split(',')
            .next()
            .unwrap_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if primary == "es" || primary.starts_with("es-") {
            Locale::Es
        } else {
            Locale::En
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default())
    }
}

/// Looks up a message key. Unknown keys are returned untouched.
pub fn translate(locale: Locale, key: &str) -> &str {
    let Some((en, es)) = catalogue(key) else {
        return key;
    };
    match locale {
        Locale::En => en,
        Locale::Es => es,
    }
}

fn catalogue(key: &str) -> Option<(&'static str, &'static str)> {
    let pair = match key {
        // users
        "username_null" => ("Username cannot be null", "El nombre de usuario no puede estar vacío"),
        "username_size" => (
            "Must have min 4 and max 32 characters",
            "Debe tener un mínimo de 4 y un máximo de 32 caracteres",
        ),
        "email_null" => ("E-mail cannot be null", "El e-mail no puede estar vacío"),
        "email_invalid" => ("E-mail is not valid", "El e-mail no es válido"),
        "email_inuse" => ("E-mail in use", "El e-mail ya está en uso"),
        "password_null" => ("Password cannot be null", "La contraseña no puede estar vacía"),
        "password_size" => (
            "Password must be at least 6 characters",
            "La contraseña debe tener al menos 6 caracteres",
        ),
        "password_pattern" => (
            "Password must have at least 1 uppercase, 1 lowercase letter and 1 number",
            "La contraseña debe tener al menos 1 mayúscula, 1 minúscula y 1 número",
        ),
        "user_create_success" => ("User created", "Usuario creado"),
        "email_failure" => ("E-mail Failure", "Fallo en el envío del e-mail"),
        "validation_failure" => ("Validation Failure", "Fallo de validación"),
        "account_activation_failure" => (
            "This account is either active or the token is invalid",
            "Esta cuenta ya está activa o el token no es válido",
        ),
        "account_activation_success" => ("Account is activated", "La cuenta ha sido activada"),
        "user_not_found" => ("User not found", "Usuario no encontrado"),
        "unauthorized_user_update" => (
            "You are not authorized to update user",
            "No está autorizado para actualizar el usuario",
        ),
        "unauthorized_user_delete" => (
            "You are not authorized to delete user",
            "No está autorizado para eliminar el usuario",
        ),
        "profile_image_size" => (
            "Your profile image cannot be bigger than 2MB",
            "Su imagen de perfil no puede superar los 2MB",
        ),
        "unsupported_image_file" => (
            "Only JPEG or PNG files are allowed",
            "Solo se permiten archivos JPEG o PNG",
        ),

        // authentication
        "authentication_failure" => ("Incorrect credentials", "Credenciales incorrectas"),
        "inactive_authentication_failure" => (
            "Account is inactive",
            "La cuenta está inactiva",
        ),

        // password reset
        "email_not_inuse" => ("E-mail not in use", "El e-mail no está registrado"),
        "password_reset_request_success" => (
            "Check your e-mail for resetting your password",
            "Revise su e-mail para restablecer su contraseña",
        ),
        "unauthorized_password_reset" => (
            "Please follow the password reset steps again",
            "Por favor, repita los pasos para restablecer la contraseña",
        ),

        // hoaxes
        "unauthorized_hoax_submit" => (
            "You are not authorized to post hoax",
            "No está autorizado para publicar un hoax",
        ),
        "hoax_submit_success" => ("Hoax is saved", "El hoax ha sido guardado"),
        "hoax_content_size" => (
            "Hoax must be min 10 and max 5000 characters",
            "El hoax debe tener un mínimo de 10 y un máximo de 5000 caracteres",
        ),
        "unauthorized_hoax_delete" => (
            "You are not authorized to delete this hoax",
            "No está autorizado para eliminar este hoax",
        ),
        "attachment_size_limit" => (
            "Uploaded file cannot be bigger than 5MB",
            "El archivo subido no puede superar los 5MB",
        ),

        // generic
        "invalid_request" => ("Invalid request", "Petición no válida"),
        "internal_server_error" => ("Internal Server Error", "Error interno del servidor"),
        _ => return None,
    };
    Some(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_spanish_only_for_es_tags() {
        assert_eq!(Locale::from_accept_language("es"), Locale::Es);
        assert_eq!(Locale::from_accept_language("es-AR,en;q=0.8"), Locale::Es);
        assert_eq!(Locale::from_accept_language("en-US,es;q=0.9"), Locale::En);
        assert_eq!(Locale::from_accept_language("fr"), Locale::En);
        assert_eq!(Locale::from_accept_language(""), Locale::En);
    }

    #[test]
    fn translates_known_keys_and_passes_unknown_through() {
        assert_eq!(translate(Locale::En, "authentication_failure"), "Incorrect credentials");
        assert_eq!(translate(Locale::Es, "authentication_failure"), "Credenciales incorrectas");
        assert_eq!(translate(Locale::Es, "no_such_key"), "no_such_key");
    }
}
