//! YAML dumps of descriptor graphs.

use serde::Serialize;

use crate::error::Result;

/// Render any serializable descriptor as a YAML document.
///
/// Output starts with a document marker and carries no trailing
/// whitespace.
///
/// # Errors
/// Returns `Yaml` if serialization fails.
///
/// # Examples
/// ```
/// use descriptor_mapper::model::SecurityRole;
/// use descriptor_mapper::yaml::generate_yaml;
///
/// let role = SecurityRole { role_name: "admin".to_string(), ..SecurityRole::default() };
/// let yaml = generate_yaml(&role).unwrap();
/// assert!(yaml.starts_with("---\n"));
/// assert!(yaml.contains("role_name: admin"));
/// ```
pub fn generate_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let yaml_string = serde_yaml_ng::to_string(value)?;
    let lines: Vec<&str> = yaml_string.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Application, Module, ModuleType};

    #[test]
    fn test_generate_yaml_skips_empty_fields() {
        let application = Application {
            display_name: Some("Shop".to_string()),
            modules: vec![Module::new(ModuleType::Web, "shop.war")],
            ..Application::default()
        };
        let yaml = generate_yaml(&application).unwrap();

        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("display_name: Shop"));
        assert!(yaml.contains("module_type: web"));
        assert!(!yaml.contains("security_roles"));
        assert!(yaml.lines().all(|line| line == line.trim_end()));
    }
}
