//! Rule name conventions
//!
//! Rule tokens use lower-case, underscore separated names (`required_if`,
//! `hello_world`). Builder method names are camel- or snake-cased on the way
//! in, so every generic rule name goes through [`to_snake_case`].

/// Convert a rule name to the token naming convention
///
/// Every upper-case letter after the first character starts a new word, so
/// `helloWorld` -> `hello_world` and `HTTPRequest` -> `h_t_t_p_request`.
/// Hyphens and spaces also become `_`, and an underscore is never doubled
/// (`max-size` and `foo_Bar` give `max_size` and `foo_bar`). Names already in
/// snake case are returned unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.trim().chars() {
        if c.is_ascii_uppercase() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '-' || c == ' ' {
            result.push('_');
        } else {
            result.push(c);
        }
    }

    result
}

/// Segment reserved by path expressions for "move to parent"
pub const MOVE_UP: &str = "..";

/// Segment reserved by path expressions for "stay in place"
pub const IN_PLACE: &str = ".";

/// Segment addressing the element node of an array
pub const WILDCARD: &str = "*";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("hello"), "hello");
        assert_eq!(to_snake_case("helloWorld"), "hello_world");
        assert_eq!(to_snake_case("helloBeautifulWorld"), "hello_beautiful_world");
        assert_eq!(to_snake_case("HelloWorld"), "hello_world");
        assert_eq!(to_snake_case("required_if"), "required_if");
        assert_eq!(to_snake_case("max-size"), "max_size");
        assert_eq!(to_snake_case("ipv4Or6"), "ipv4_or6");
        assert_eq!(to_snake_case("foo_Bar"), "foo_bar");
    }

    #[test]
    fn test_consecutive_capitals_split_into_letters() {
        assert_eq!(to_snake_case("HTTPRequest"), "h_t_t_p_request");
        assert_eq!(to_snake_case("isUUID"), "is_u_u_i_d");
    }
}
