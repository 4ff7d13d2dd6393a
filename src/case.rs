//! Name casing: model names are looked up upper-cased per underscore segment; table names default to snake_case.

/// Normalize a model name for registry lookup.
/// e.g. "project_category" -> "PROJECT_CATEGORY", "Category" -> "CATEGORY"
pub fn normalize_model_name(s: &str) -> String {
    s.trim()
        .split('_')
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a single identifier from CamelCase to snake_case.
/// e.g. "ProjectCategory" -> "project_category", "Project_Category" -> "project_category"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_model_name() {
        assert_eq!(normalize_model_name("project_category"), "PROJECT_CATEGORY");
        assert_eq!(normalize_model_name("PROJECT_CATEGORY"), "PROJECT_CATEGORY");
        assert_eq!(normalize_model_name("Project_Category"), "PROJECT_CATEGORY");
        assert_eq!(normalize_model_name(" category "), "CATEGORY");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Category"), "category");
        assert_eq!(to_snake_case("ProjectCategory"), "project_category");
        assert_eq!(to_snake_case("Project_Category"), "project_category");
        assert_eq!(to_snake_case("project"), "project");
    }
}
