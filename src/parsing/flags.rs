//! The fixed flag table, output-prefix assembly, and the built-in
//! redefinitions that flags imply

use crate::language::{Expression, Value, Variable};

#[derive(Debug, PartialEq, Eq)]
pub struct Flag {
    pub name: &'static str,
    pub letter: &'static str,
    pub global_only: bool,
}

/// Every flag the target dialect understands. Global-only flags configure
/// the whole pattern and are rejected in scoped position.
pub const FLAGS: &[Flag] = &[
    Flag { name: "ascii", letter: "a", global_only: true },
    Flag { name: "bestmatch", letter: "b", global_only: true },
    Flag { name: "dotall", letter: "s", global_only: false },
    Flag { name: "enhancedmatch", letter: "e", global_only: true },
    Flag { name: "fullcase", letter: "f", global_only: false },
    Flag { name: "ignorecase", letter: "i", global_only: false },
    Flag { name: "locale", letter: "L", global_only: true },
    Flag { name: "multiline", letter: "m", global_only: false },
    Flag { name: "reverse", letter: "r", global_only: true },
    Flag { name: "unicode", letter: "u", global_only: true },
    Flag { name: "verbose", letter: "x", global_only: false },
    Flag { name: "version0", letter: "V0", global_only: true },
    Flag { name: "version1", letter: "V1", global_only: true },
    Flag { name: "word", letter: "w", global_only: true },
];

// Single-letter flags in the order they appear in an emitted flags group.
// Version flags always come last and are handled separately.
const LETTER_ORDER: &[&str] = &["u", "a", "L", "b", "e", "r", "w", "m", "s", "i", "f", "x"];

pub fn by_name(name: &str) -> Option<&'static Flag> {
    FLAGS
        .iter()
        .find(|flag| flag.name == name)
}

/// A validated set of flags to turn on and off, as written in one `(...)`
/// construct.
#[derive(Debug, Default)]
pub struct Flagset {
    pub turn_on: Vec<&'static Flag>,
    pub turn_off: Vec<&'static Flag>,
}

impl Flagset {
    fn turns_on(&self, name: &str) -> bool {
        self.turn_on
            .iter()
            .any(|flag| flag.name == name)
    }

    fn turns_off(&self, name: &str) -> bool {
        self.turn_off
            .iter()
            .any(|flag| flag.name == name)
    }
}

/// The inline-flags group prefixed to every non-empty compiled pattern. The
/// user's global turn-ons are merged with the defaults: unicode (unless a
/// conflicting character-set flag was chosen or it was turned off),
/// multiline (unless turned off), and V1 (unless a version flag was chosen).
/// Turn-offs remove defaults rather than emitting a `-` group, which the
/// dialect only allows in scoped position.
pub fn prefix(global: Option<&Flagset>) -> String {
    let empty = Flagset::default();
    let global = global.unwrap_or(&empty);

    let mut letters: Vec<&str> = Vec::new();
    for flag in &global.turn_on {
        if flag.letter != "V0" && flag.letter != "V1" && !letters.contains(&flag.letter) {
            letters.push(flag.letter);
        }
    }

    let want_unicode = !global.turns_on("ascii")
        && !global.turns_on("locale")
        && !global.turns_off("unicode");
    if want_unicode && !letters.contains(&"u") {
        letters.push("u");
    }
    if !global.turns_off("multiline") && !letters.contains(&"m") {
        letters.push("m");
    }

    let version = if global.turns_on("version0") {
        "V0"
    } else {
        "V1"
    };

    let mut result = String::from("(?");
    for letter in LETTER_ORDER {
        if letters.contains(letter) {
            result.push_str(letter);
        }
    }
    result.push_str(version);
    result.push(')');
    result
}

/// The scoped form: `(?on-off:body)`.
pub fn inline_group(set: &Flagset, body: &str) -> String {
    let mut on = String::new();
    let mut off = String::new();
    for letter in LETTER_ORDER {
        if set
            .turn_on
            .iter()
            .any(|flag| flag.letter == *letter)
        {
            on.push_str(letter);
        }
        if set
            .turn_off
            .iter()
            .any(|flag| flag.letter == *letter)
        {
            off.push_str(letter);
        }
    }
    if off.is_empty() {
        format!("(?{}:{})", on, body)
    } else {
        format!("(?{}-{}:{})", on, off, body)
    }
}

fn rebind(name: &str, text: &str) -> Variable {
    Variable {
        name: name.to_string(),
        value: Value::Pattern(Expression::new(text.to_string())),
        lineno: 0,
    }
}

/// The built-ins whose meaning a flagset changes. The defaults in the root
/// scope assume multiline on and dotall off; turning either the other way
/// rebinds the affected variables for the duration of the flag scope.
pub fn rebound_builtins(set: &Flagset) -> Vec<Variable> {
    let mut rebound = Vec::new();
    if set.turns_on("multiline") {
        rebound.push(rebind("BOL", "^"));
        rebound.push(rebind("EOL", "$"));
    }
    if set.turns_off("multiline") {
        rebound.push(rebind("BOL", "(?m:^)"));
        rebound.push(rebind("EOL", "(?m:$)"));
    }
    if set.turns_on("dotall") {
        rebound.push(rebind("any", "."));
    }
    if set.turns_off("dotall") {
        rebound.push(rebind("any", "(?s:.)"));
    }
    rebound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagset(on: &[&str], off: &[&str]) -> Flagset {
        Flagset {
            turn_on: on
                .iter()
                .map(|name| by_name(name).unwrap())
                .collect(),
            turn_off: off
                .iter()
                .map(|name| by_name(name).unwrap())
                .collect(),
        }
    }

    #[test]
    fn check_default_prefix() {
        assert_eq!(prefix(None), "(?umV1)");
    }

    #[test]
    fn check_prefix_merges_user_flags() {
        assert_eq!(prefix(Some(&flagset(&["ignorecase"], &[]))), "(?umiV1)");
        assert_eq!(prefix(Some(&flagset(&["ascii"], &[]))), "(?amV1)");
        assert_eq!(prefix(Some(&flagset(&["version0"], &[]))), "(?umV0)");
        assert_eq!(
            prefix(Some(&flagset(&["word", "verbose"], &[]))),
            "(?uwmxV1)"
        );
    }

    #[test]
    fn check_prefix_turn_off_removes_default() {
        assert_eq!(prefix(Some(&flagset(&[], &["multiline"]))), "(?uV1)");
        assert_eq!(prefix(Some(&flagset(&[], &["unicode"]))), "(?mV1)");
    }

    #[test]
    fn check_inline_group() {
        assert_eq!(inline_group(&flagset(&["ignorecase"], &[]), "x"), "(?i:x)");
        assert_eq!(
            inline_group(&flagset(&["dotall"], &["ignorecase", "multiline"]), "x"),
            "(?s-mi:x)"
        );
    }

    #[test]
    fn check_rebound_builtins() {
        let rebound = rebound_builtins(&flagset(&["dotall"], &["multiline"]));
        let names: Vec<&str> = rebound
            .iter()
            .map(|variable| variable.name.as_str())
            .collect();
        assert_eq!(names, vec!["BOL", "EOL", "any"]);
    }
}
