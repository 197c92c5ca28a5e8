use crate::utils::error::{ImportError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_dimension(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("store.path", "./models").is_ok());
        assert!(validate_path("store.path", "").is_err());
        assert!(validate_path("store.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_dimension() {
        assert!(validate_positive_dimension("layout.task_width", 100.0).is_ok());
        assert!(validate_positive_dimension("layout.task_width", 0.0).is_err());
        assert!(validate_positive_dimension("layout.task_width", -5.0).is_err());
        assert!(validate_positive_dimension("layout.task_width", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("store.kind", "file", &["file", "memory"]).is_ok());
        let err = validate_one_of("store.kind", "s3", &["file", "memory"]).unwrap_err();
        assert!(err.to_string().contains("file, memory"));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("import.author", "admin").is_ok());
        assert!(validate_non_empty_string("import.author", "   ").is_err());
    }
}
