use std::collections::BTreeMap;
use std::sync::LazyLock;

use sbp_core::{BlueprintError, Role};
use unicode_normalization::UnicodeNormalization;

/// Glyphs accepted in place of `>` in a legacy role flow.
const FLOW_ARROW_GLYPHS: [char; 4] = ['→', '—', '–', '－'];

/// Glyphs accepted in place of `>` in a legacy action chain.
const ACTION_ARROW_GLYPHS: [char; 1] = ['→'];

static ROLE_ALIASES: LazyLock<BTreeMap<&'static str, Role>> = LazyLock::new(|| {
    BTreeMap::from([
        ("C", Role::Customer),
        ("F", Role::Frontstage),
        ("B", Role::Backstage),
        ("P", Role::Support),
        ("CUSTOMER", Role::Customer),
        ("CLIENT", Role::Customer),
        ("CUST", Role::Customer),
        ("FRONT", Role::Frontstage),
        ("FRONTSTAGE", Role::Frontstage),
        ("BACK", Role::Backstage),
        ("BACKSTAGE", Role::Backstage),
        ("SUPPORT", Role::Support),
        ("SUP", Role::Support),
        ("PROCESS", Role::Support),
        ("PROC", Role::Support),
    ])
});

/// Resolve a free-form role word or letter.
///
/// Tries the whole token, then its first character against the alias table,
/// then the first character as a literal code.
pub fn resolve_role(token: &str) -> Result<Role, BlueprintError> {
    let key = token.trim().to_uppercase();
    if let Some(role) = ROLE_ALIASES.get(key.as_str()) {
        return Ok(*role);
    }

    let unsupported = || BlueprintError::UnsupportedRole {
        token: token.to_string(),
    };
    let first = key.chars().next().ok_or_else(unsupported)?;
    let mut buf = [0_u8; 4];
    if let Some(role) = ROLE_ALIASES.get(&*first.encode_utf8(&mut buf)) {
        return Ok(*role);
    }
    Role::from_code(first).ok_or_else(unsupported)
}

/// Resolve the leading character of an inline segment. Only bare letters count.
#[must_use]
pub fn role_from_prefix(ch: char) -> Option<Role> {
    Role::from_code(ch.to_ascii_uppercase())
}

/// Full-width and other compatibility forms to their plain equivalents (NFKC).
#[must_use]
pub fn compatibility_normalize(text: &str) -> String {
    text.nfkc().collect()
}

/// Split a legacy role flow on `>` and its glyph variants, dropping empty tokens.
#[must_use]
pub fn split_flow(flow: &str) -> Vec<&str> {
    split_chain(flow, &FLOW_ARROW_GLYPHS)
}

/// Split a legacy action chain on `>` and `→`, dropping empty entries.
#[must_use]
pub fn split_actions(actions: &str) -> Vec<&str> {
    split_chain(actions, &ACTION_ARROW_GLYPHS)
}

fn split_chain<'a>(chain: &'a str, glyphs: &[char]) -> Vec<&'a str> {
    chain
        .split(|ch: char| ch == '>' || glyphs.contains(&ch))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Rewrite arrow separators in an inline body to `/`.
#[must_use]
pub fn unify_inline_separators(body: &str) -> String {
    body.chars()
        .map(|ch| if matches!(ch, '→' | '>') { '/' } else { ch })
        .collect()
}
