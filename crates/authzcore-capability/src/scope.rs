//! Hierarchical scope grammar: `tool:<T>/method:<M>`, where `<T>` and `<M>`
//! are each either an identifier (alphanumeric and `_`) or the literal `*`.

use crate::error::ScopeError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedScope {
    tool: String,
    method: String,
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn parse(scope: &str) -> Result<ParsedScope, ScopeError> {
    let (tool_part, method_part) = scope
        .split_once('/')
        .ok_or_else(|| ScopeError::Malformed(scope.to_string()))?;

    let tool = tool_part
        .strip_prefix("tool:")
        .ok_or_else(|| ScopeError::Malformed(scope.to_string()))?;
    let method = method_part
        .strip_prefix("method:")
        .ok_or_else(|| ScopeError::Malformed(scope.to_string()))?;

    if tool != "*" && !is_identifier(tool) {
        return Err(ScopeError::Malformed(scope.to_string()));
    }
    if method != "*" && !is_identifier(method) {
        return Err(ScopeError::Malformed(scope.to_string()));
    }

    Ok(ParsedScope {
        tool: tool.to_string(),
        method: method.to_string(),
    })
}

/// Validate that `scope` follows the `tool:<T>/method:<M>` grammar.
pub fn validate(scope: &str) -> Result<(), ScopeError> {
    parse(scope).map(|_| ())
}

/// Does `scope(T, M)` accept a request for `(tool, method)`?
pub fn matches(scope: &str, tool: &str, method: &str) -> Result<bool, ScopeError> {
    let parsed = parse(scope)?;
    let tool_ok = parsed.tool == "*" || parsed.tool == tool;
    let method_ok = parsed.method == "*" || parsed.method == method;
    Ok(tool_ok && method_ok)
}

/// Is every `(t, m)` accepted by `child` also accepted by `parent`?
fn is_subset(parent: &ParsedScope, child: &ParsedScope) -> bool {
    let tool_ok = parent.tool == "*" || parent.tool == child.tool;
    let method_ok = parent.method == "*" || parent.method == child.method;
    tool_ok && method_ok
}

/// `narrow(parent, child)` returns `child` if it matches a subset of
/// `parent`'s accepted requests (equality is the degenerate, allowed case).
/// Otherwise fails with `ScopeError::NotNarrower`.
pub fn narrow(parent: &str, child: &str) -> Result<String, ScopeError> {
    let parent_parsed = parse(parent)?;
    let child_parsed = parse(child)?;

    if is_subset(&parent_parsed, &child_parsed) {
        Ok(child.to_string())
    } else {
        Err(ScopeError::NotNarrower {
            parent: parent.to_string(),
            child: child.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(matches("tool:fs/method:read", "fs", "read").unwrap());
        assert!(!matches("tool:fs/method:read", "fs", "write").unwrap());
    }

    #[test]
    fn wildcard_tool_matches_any() {
        assert!(matches("tool:*/method:read", "fs", "read").unwrap());
        assert!(matches("tool:*/method:read", "net", "read").unwrap());
        assert!(!matches("tool:*/method:read", "net", "write").unwrap());
    }

    #[test]
    fn wildcard_method_matches_any() {
        assert!(matches("tool:fs/method:*", "fs", "read").unwrap());
        assert!(matches("tool:fs/method:*", "fs", "write").unwrap());
    }

    #[test]
    fn malformed_scope_rejected() {
        assert!(validate("fs:read").is_err());
        assert!(validate("tool:fs").is_err());
        assert!(validate("tool:fs/method:re ad").is_err());
    }

    #[test]
    fn narrow_exact_scope_is_allowed() {
        let narrowed = narrow("tool:fs/method:read", "tool:fs/method:read").unwrap();
        assert_eq!(narrowed, "tool:fs/method:read");
    }

    #[test]
    fn narrow_strict_subset_is_allowed() {
        let narrowed = narrow("tool:fs/method:*", "tool:fs/method:read").unwrap();
        assert_eq!(narrowed, "tool:fs/method:read");
    }

    #[test]
    fn narrow_wider_scope_is_rejected() {
        assert!(narrow("tool:fs/method:read", "tool:fs/method:*").is_err());
    }

    #[test]
    fn narrow_disjoint_scope_is_rejected() {
        assert!(narrow("tool:fs/method:read", "tool:net/method:*").is_err());
    }

    #[test]
    fn narrow_is_transitive() {
        let once = narrow("tool:*/method:*", "tool:fs/method:*").unwrap();
        let twice = narrow(&once, "tool:fs/method:read").unwrap();
        assert_eq!(twice, "tool:fs/method:read");
    }
}
