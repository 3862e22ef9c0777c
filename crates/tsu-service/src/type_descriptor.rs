//! Type display strings to host type descriptors.

use serde::{Deserialize, Serialize};

pub const UNION_SEPARATOR: &str = " | ";
const ARRAY_SUFFIX: &str = "[]";

/// One member of a type: its name and how many array levels wrap it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub dimensions: u32,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, dimensions: u32) -> Self {
        TypeDescriptor {
            name: name.into(),
            dimensions,
        }
    }
}

/// Split a display string into its union members, in display order.
///
/// Every `[]` in a member counts as one dimension and is removed from the
/// name, wherever it appears.
///
/// ```
/// use tsu_service::type_descriptor::{TypeDescriptor, parse_type};
///
/// assert_eq!(
///     parse_type("Foo[] | Bar"),
///     vec![TypeDescriptor::new("Foo", 1), TypeDescriptor::new("Bar", 0)]
/// );
/// ```
pub fn parse_type(display: &str) -> Vec<TypeDescriptor> {
    display
        .split(UNION_SEPARATOR)
        .map(|member| TypeDescriptor {
            name: member.replace(ARRAY_SUFFIX, ""),
            dimensions: member.matches(ARRAY_SUFFIX).count() as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_type() {
        assert_eq!(parse_type("Number"), vec![TypeDescriptor::new("Number", 0)]);
    }

    #[test]
    fn test_dimensions_are_counted() {
        assert_eq!(parse_type("Number[][]"), vec![TypeDescriptor::new("Number", 2)]);
    }

    #[test]
    fn test_union_members_keep_display_order() {
        assert_eq!(
            parse_type("String | AActor[] | Number"),
            vec![
                TypeDescriptor::new("String", 0),
                TypeDescriptor::new("AActor", 1),
                TypeDescriptor::new("Number", 0),
            ]
        );
    }

    #[test]
    fn test_inner_brackets_are_removed() {
        assert_eq!(
            parse_type("Map[][]x"),
            vec![TypeDescriptor::new("Mapx", 2)]
        );
    }
}
