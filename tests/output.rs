#[cfg(test)]
mod output {
    use oprex::compile;

    /// Compile and check the exact emitted pattern. The dialect targeted by
    /// the output (possessive quantifiers, atomic groups, subroutine calls)
    /// is richer than what any engine available here executes, so these
    /// tests pin down the text itself. The raw strings below deliberately
    /// keep their surrounding newlines: oprex requires the first and last
    /// lines to be blank.
    fn given(source: &str, expect_regex: &str) {
        match compile(source) {
            Ok(pattern) => assert_eq!(pattern, expect_regex, "for input: {:?}", source),
            Err(error) => panic!("compilation of {:?} failed: {}", source, error),
        }
    }

    #[test]
    fn empties() {
        given("", "");
        given("\n", "");
        given("\n\n", "");
        given("\n\n\n", "");
    }

    #[test]
    fn compilation_is_deterministic() {
        let source = "\n/air/man?/ship?/\n    air = 'air'\n    man = 'man'\n    ship = 'ship'\n";
        let first = compile(source).unwrap();
        let second = compile(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn simple_optional() {
        // 'aether' and 'ether' both fully match this
        given(
            r#"
/a?/ether/
    ether = /e/ther/
        e = 'e'
        ther = 'ther'
    a = 'a'
"#,
            "(?umV1)a?+ether",
        );
    }

    #[test]
    fn independent_optionals() {
        // matches 'air', 'airman', 'airship', 'airmanship'; never 'manship'
        given(
            r#"
/air/man?/ship?/
    air = 'air'
    man = 'man'
    ship = 'ship'
"#,
            "(?umV1)air(?:man)?+(?:ship)?+",
        );
    }

    #[test]
    fn string_escaping() {
        given("\norly\n    orly = \"O RLY?\"\n", "(?umV1)O RLY\\?");
        given("\n'1+1'\n", "(?umV1)1\\+1");
    }

    #[test]
    fn escape_sequences_in_strings_survive() {
        given("\n'tab\\there'\n", "(?umV1)tab\\there");
        given("\n'\\x41'\n", "(?umV1)\\x41");
    }

    #[test]
    fn boundary_anchors() {
        given("\n.'cat'.\n", "(?umV1)\\bcat\\b");
        given("\n_'cat'\n", "(?umV1)\\Bcat");
    }

    #[test]
    fn chained_assignment() {
        given(
            r#"
/a/b/
    a = b = 'x'
"#,
            "(?umV1)xx",
        );
    }

    #[test]
    fn builtin_classes() {
        given("\nalpha\n", "(?umV1)[a-zA-Z]");
        given("\ndigit\n", "(?umV1)[0-9]");
        given("\nany\n", "(?umV1)(?s:.)");
        given("\n/BOS/alpha/EOS/\n", "(?umV1)\\A[a-zA-Z]\\Z");
    }

    #[test]
    fn class_range() {
        // any single uppercase ASCII letter, nothing else
        given("\nuppercase\n    uppercase: A..Z\n", "(?umV1)[A-Z]");
    }

    #[test]
    fn class_composition() {
        given(
            r#"
x
    x: +vowel +digit
        vowel: a i u e o
"#,
            "(?umV1)[aiueo0-9]",
        );
        given("\nx\n    x: not: digit\n", "(?umV1)[^0-9]");
        given("\nx\n    x: alpha and upper\n", "(?umV1)[a-zA-Z&&A-Z]");
        given("\nx\n    x: not: /Alphabetic\n", "(?umV1)\\P{Alphabetic}");
        given("\nx\n    x: U+41 U+1F4A9\n", "(?umV1)[\\u0041\\U0001F4A9]");
    }

    #[test]
    fn quantifier_forms() {
        given("\n3 of digit\n", "(?umV1)[0-9]{3}");
        given("\n1 of digit\n", "(?umV1)[0-9]");
        given("\n1.. of digit\n", "(?umV1)[0-9]++");
        given("\n0..1 of digit\n", "(?umV1)[0-9]?+");
        given("\n2..5 of digit\n", "(?umV1)[0-9]{2,5}+");
        given("\n2.. <<- of digit\n", "(?umV1)[0-9]{2,}");
        given("\n0.. <<- of digit\n", "(?umV1)[0-9]*");
        given("\n2..5 <<- of digit\n", "(?umV1)[0-9]{2,5}");
        given("\n1 <<+.. of digit\n", "(?umV1)[0-9]+?");
        given("\n1 <<+..5 of digit\n", "(?umV1)[0-9]{1,5}?");
        given("\n? of digit\n", "(?umV1)[0-9]?+");
    }

    #[test]
    fn quantified_string_needs_group() {
        given("\n2 of 'ab'\n", "(?umV1)(?:ab){2}");
        given("\n2 of 'a'\n", "(?umV1)a{2}");
    }

    #[test]
    fn quantified_inline_class() {
        given("\n2 of: a b\n", "(?umV1)[ab]{2}");
    }

    #[test]
    fn nested_exact_repeats_merge() {
        // {2} inside {3} collapses to {6}, not {2}{3}
        given(
            r#"
3 of byte
    byte = 2 of hex
        hex: +digit a..f A..F
"#,
            "(?umV1)[0-9a-fA-F]{6}",
        );
    }

    #[test]
    fn optional_of_repeat_merges() {
        given(
            r#"
? of some
    some = 1.. of digit
"#,
            "(?umV1)[0-9]*+",
        );
    }

    #[test]
    fn capturing_and_atomic_declarations() {
        given(
            r#"
/year/dash/=year/
    [year] = 4 of digit
    dash = '-'
"#,
            "(?umV1)(?<year>[0-9]{4})-(?P=year)",
        );
        given(
            r#"
x
    @x = 'abc'
"#,
            "(?umV1)(?>abc)",
        );
        given(
            r#"
x
    @[x] = 'abc'
"#,
            "(?umV1)(?<x>(?>abc))",
        );
    }

    #[test]
    fn forward_reference_to_capture() {
        given(
            r#"
/=word/word/
    [word] = 'w'
"#,
            "(?umV1)(?P=word)(?<word>w)",
        );
    }

    #[test]
    fn subroutine_call() {
        given(
            r#"
/num/comma/&num/
    [num] = 1.. of digit
    comma = ','
"#,
            "(?umV1)(?<num>[0-9]++),(?&num)",
        );
    }

    #[test]
    fn optional_cells_of_groups_stay_bare() {
        given(
            r#"
/word/=word?/
    [word] = 'w'
"#,
            "(?umV1)(?<word>w)(?P=word)?+",
        );
    }

    #[test]
    fn alternation() {
        given(
            r#"
<<|
    |'cat'
    |'dog'
    |animal
    animal = 'ox'
"#,
            "(?umV1)(?:cat|dog|ox)",
        );
    }

    #[test]
    fn alternation_with_quantified_branch() {
        given(
            r#"
<<|
    |3 of digit
    |: a b
"#,
            "(?umV1)(?:[0-9]{3}|[ab])",
        );
    }

    #[test]
    fn lookaround() {
        given(
            r#"
<@>
    <!'-'|
    |digits>
    digits = 1.. of digit
"#,
            "(?umV1)(?<!-)(?=[0-9]++)",
        );
        given(
            r#"
<@>
    <'USD'|
    |!'0'>
"#,
            "(?umV1)(?<=USD)(?!0)",
        );
    }

    #[test]
    fn global_flags_line() {
        given("\n(ignorecase)\n'aha'\n", "(?umiV1)aha");
        given("\n(ignorecase)\n    'aha'\n", "(?umiV1)aha");
        given("\n(ascii version0)\n'aha'\n", "(?amV0)aha");
        given("\n(-multiline)\n'aha'\n", "(?uV1)aha");
    }

    #[test]
    fn scoped_flags() {
        given(
            r#"
x
    x = (ignorecase)
        'aha'
"#,
            "(?umV1)(?i:aha)",
        );
        given(
            r#"
x
    x = (-ignorecase)
        'aha'
"#,
            "(?umV1)(?-i:aha)",
        );
    }

    #[test]
    fn flags_rebind_builtins() {
        given("\n(dotall)\nany\n", "(?umsV1).");
        given(
            r#"
x
    x = (dotall)
        any
"#,
            "(?umV1)(?s:.)",
        );
        given(
            r#"
x
    x = (-multiline)
        BOL
"#,
            "(?umV1)(?-m:(?m:^))",
        );
    }

    #[test]
    fn globalmark_defines_in_all_scopes() {
        given(
            r#"
/salutation/name/
    salutation = /greet/name?/
        greet = 'Hi '
*)      name = 'World'
"#,
            "(?umV1)Hi (?:World)?+World",
        );
    }

    #[test]
    fn capture_registered_in_nested_scope() {
        // the capture is declared deep in a nested block; the backreference
        // in the root chain still validates
        given(
            r#"
/pair/=half/
    pair = /half/half/
*)      [half] = 2 of digit
"#,
            "(?umV1)(?<half>[0-9]{2})(?<half>[0-9]{2})(?P=half)",
        );
    }
}
