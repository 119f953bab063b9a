//! Scoped identifier codec.
//!
//! Every routable UI component in the system carries a single string
//! identifier of the shape:
//!
//! ```text
//! module:command:kind:local_name[:key=value ...]
//! ```
//!
//! The external platform imposes a hard ceiling of 100 characters on
//! component identifiers, so [`ScopedId::encode`] truncates anything
//! longer. Truncation is a naive character cut; it can eat trailing
//! extras, which [`ScopedId::decode`] tolerates by returning whatever
//! extras survived. This codec is the single source of truth for the
//! identifier shape: buttons, every select-menu variant, and modals all
//! go through it so the dispatcher can route them back.

use tracing::warn;

/// Hard ceiling on encoded identifier length, imposed by the platform.
pub const SCOPED_ID_MAX_LEN: usize = 100;

/// Separator between identifier segments.
const SEGMENT_SEP: char = ':';

/// Separator between an extra's key and value.
const KV_SEP: char = '=';

/// A decoded scoped identifier.
///
/// Produced by [`ScopedId::decode`], which is total: it never fails,
/// even on truncated or malformed input. Missing core segments decode
/// to empty strings; extras segments without a `=` are ignored.
///
/// # Example
///
/// ```
/// use swb_types::ScopedId;
///
/// let id = ScopedId::encode("shop", "buy", "btn", "confirm", &[("sku", "AB:12")]);
/// assert_eq!(id, "shop:buy:btn:confirm:sku=AB_12");
///
/// let parts = ScopedId::decode(&id);
/// assert_eq!(parts.module, "shop");
/// assert_eq!(parts.command, "buy");
/// assert_eq!(parts.kind, "btn");
/// assert_eq!(parts.local_name, "confirm");
/// assert_eq!(parts.extra("sku"), Some("AB_12"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedId {
    /// Owning module name.
    pub module: String,
    /// Owning command name.
    pub command: String,
    /// Component kind wire name (e.g. `btn`, `ssel`, `modal`).
    pub kind: String,
    /// Local component name within the command.
    pub local_name: String,
    /// Extra key-value pairs, in encoded order.
    pub extras: Vec<(String, String)>,
}

impl ScopedId {
    /// Encodes a scoped identifier.
    ///
    /// Joins `module`, `command`, `kind` and `local_name` with `:`,
    /// then appends one `key=value` segment per extra. Literal `:` or
    /// `=` inside an extra value is replaced with `_` before joining,
    /// so the segment structure survives arbitrary values.
    ///
    /// The result is truncated to [`SCOPED_ID_MAX_LEN`] characters.
    /// Truncation is extras-unaware: a cut in the middle of a trailing
    /// `key=value` pair is not repaired, only logged.
    #[must_use]
    pub fn encode(
        module: &str,
        command: &str,
        kind: &str,
        local_name: &str,
        extras: &[(&str, &str)],
    ) -> String {
        let mut out = String::new();
        out.push_str(module);
        out.push(SEGMENT_SEP);
        out.push_str(command);
        out.push(SEGMENT_SEP);
        out.push_str(kind);
        out.push(SEGMENT_SEP);
        out.push_str(local_name);

        for (key, value) in extras {
            out.push(SEGMENT_SEP);
            out.push_str(key);
            out.push(KV_SEP);
            out.push_str(&escape_value(value));
        }

        if out.chars().count() > SCOPED_ID_MAX_LEN {
            warn!(
                module,
                command,
                kind,
                local_name,
                len = out.chars().count(),
                "scoped id exceeds {SCOPED_ID_MAX_LEN} chars, truncating"
            );
            out = out.chars().take(SCOPED_ID_MAX_LEN).collect();
        }

        out
    }

    /// Decodes a scoped identifier.
    ///
    /// Splits on `:`; the first four segments map to module, command,
    /// kind and local name, the remainder are parsed as `key=value`
    /// extras. Segments without a `=` (including a pair whose `=` was
    /// lost to truncation) are silently dropped. Never fails.
    #[must_use]
    pub fn decode(id: &str) -> Self {
        let mut segments = id.split(SEGMENT_SEP);

        let mut next = || segments.next().unwrap_or_default().to_string();
        let module = next();
        let command = next();
        let kind = next();
        let local_name = next();

        let extras = segments
            .filter_map(|segment| {
                segment
                    .split_once(KV_SEP)
                    .map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect();

        Self {
            module,
            command,
            kind,
            local_name,
            extras,
        }
    }

    /// Returns the value of the first extra with the given key.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for ScopedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extras: Vec<(&str, &str)> = self
            .extras
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        write!(
            f,
            "{}",
            Self::encode(
                &self.module,
                &self.command,
                &self.kind,
                &self.local_name,
                &extras
            )
        )
    }
}

/// Replaces separator characters inside an extra value with `_`.
fn escape_value(value: &str) -> String {
    value.replace([SEGMENT_SEP, KV_SEP], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_without_extras() {
        let id = ScopedId::encode("shop", "buy", "btn", "confirm", &[]);
        assert_eq!(id, "shop:buy:btn:confirm");

        let parts = ScopedId::decode(&id);
        assert_eq!(parts.module, "shop");
        assert_eq!(parts.command, "buy");
        assert_eq!(parts.kind, "btn");
        assert_eq!(parts.local_name, "confirm");
        assert!(parts.extras.is_empty());
    }

    #[test]
    fn round_trip_with_extras() {
        let id = ScopedId::encode(
            "shop",
            "buy",
            "ssel",
            "item",
            &[("page", "2"), ("sort", "price")],
        );
        let parts = ScopedId::decode(&id);
        assert_eq!(
            parts.extras,
            vec![
                ("page".to_string(), "2".to_string()),
                ("sort".to_string(), "price".to_string()),
            ]
        );
        assert_eq!(parts.extra("page"), Some("2"));
        assert_eq!(parts.extra("missing"), None);
    }

    #[test]
    fn escapes_separators_in_values() {
        let id = ScopedId::encode("shop", "buy", "btn", "confirm", &[("sku", "AB:12")]);
        let parts = ScopedId::decode(&id);
        assert_eq!(parts.extra("sku"), Some("AB_12"));

        let id = ScopedId::encode("shop", "buy", "btn", "confirm", &[("eq", "a=b")]);
        let parts = ScopedId::decode(&id);
        assert_eq!(parts.extra("eq"), Some("a_b"));
    }

    #[test]
    fn length_bound_holds_for_all_inputs() {
        let long = "x".repeat(200);
        let id = ScopedId::encode(&long, &long, "btn", &long, &[("k", &long)]);
        assert_eq!(id.chars().count(), SCOPED_ID_MAX_LEN);

        let id = ScopedId::encode("m", "c", "btn", "n", &[]);
        assert!(id.chars().count() <= SCOPED_ID_MAX_LEN);
    }

    #[test]
    fn truncation_drops_partial_extras_on_decode() {
        // Core fits, but the second extra straddles the 100-char cut.
        let module = "mod";
        let command = "cmd";
        let local = "name";
        // 3+3+3+4 core chars plus separators put the 100-char cut
        // inside ":trailing", before its "=".
        let filler = "v".repeat(75);
        let id = ScopedId::encode(
            module,
            command,
            "btn",
            local,
            &[("a", &filler), ("trailing", "value")],
        );
        assert_eq!(id.chars().count(), SCOPED_ID_MAX_LEN);

        let parts = ScopedId::decode(&id);
        assert_eq!(parts.module, module);
        assert_eq!(parts.local_name, local);
        // First extra survives, the mangled trailing pair is dropped.
        assert_eq!(parts.extra("a"), Some(filler.as_str()));
        assert_eq!(parts.extra("trailing"), None);
    }

    #[test]
    fn decode_is_total_on_short_input() {
        let parts = ScopedId::decode("only:two");
        assert_eq!(parts.module, "only");
        assert_eq!(parts.command, "two");
        assert_eq!(parts.kind, "");
        assert_eq!(parts.local_name, "");
        assert!(parts.extras.is_empty());
    }

    #[test]
    fn decode_ignores_segments_without_kv_separator() {
        let parts = ScopedId::decode("m:c:btn:n:noequals:k=v");
        assert_eq!(parts.extras, vec![("k".to_string(), "v".to_string())]);
    }

    #[test]
    fn display_re_encodes() {
        let parts = ScopedId::decode("shop:buy:btn:confirm:sku=AB_12");
        assert_eq!(parts.to_string(), "shop:buy:btn:confirm:sku=AB_12");
    }
}
