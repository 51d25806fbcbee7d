#[cfg(test)]
mod errors {
    use oprex::compile;

    /// Compile deliberately broken source and check the rendered error.
    fn given(source: &str, expect_error: &str) {
        match compile(source) {
            Ok(pattern) => panic!(
                "expected compilation of {:?} to fail, but it produced: {}",
                source, pattern
            ),
            Err(error) => assert_eq!(
                error.to_string(),
                expect_error,
                "for input: {:?}",
                source
            ),
        }
    }

    #[test]
    fn white_guards() {
        given(
            "one-liner input",
            "Line 1: First line must be blank, not: one-liner input",
        );
        given(
            "something in the first line\n",
            "Line 1: First line must be blank, not: something in the first line",
        );
        given(
            "\nsomething in the last line",
            "Line 2: Last line must be blank, not: something in the last line",
        );
    }

    #[test]
    fn unknown_symbol() {
        given("\n`@#$%^;{}\n", "Line 2: Unsupported syntax: `@#$%^;{}");
    }

    #[test]
    fn unexpected_token() {
        given(
            "\n/to/be/?\n",
            "Line 2: Unexpected QUESTION\n/to/be/?\n       ^",
        );
        given(
            "\n'no''gap'\n",
            "Line 2: Unexpected STRING\n'no''gap'\n    ^",
        );
    }

    #[test]
    fn mixed_indentation() {
        given(
            "\n \tthis_line_mixes_tab_and_spaces_for_indentation\n",
            "Line 2: Cannot mix space and tab for indentation",
        );
    }

    #[test]
    fn inconsistent_indent_character() {
        given(
            "\nx\n\ta = 'a'\n    b = 'b'\n",
            "Line 4: Inconsistent indentation character",
        );
    }

    #[test]
    fn invalid_dedent_target() {
        given(
            "\nx\n        a = 'a'\n    b = 'b'\n",
            "Line 4: Indentation error",
        );
    }

    #[test]
    fn undefined_variable() {
        given("\nbigfoot\n", "Line 2: Variable 'bigfoot' is not defined");
        given(
            "\n/horses/and/unicorns/\n    horses = 'Thoroughbreds'\n    and = ' and '\n",
            "Line 2: Variable 'unicorns' is not defined",
        );
    }

    #[test]
    fn illegal_variable_name() {
        given(
            "\n101dalmatians\n",
            "Line 2: Illegal variable name (must start with a letter): 101dalmatians",
        );
        given(
            "\n_this_\n",
            "Line 2: Illegal variable name (must start with a letter): _this_",
        );
        given(
            "\netc_\n",
            "Line 2: Illegal variable name (must not end with underscore): etc_",
        );
    }

    #[test]
    fn duplicate_variable() {
        given(
            "\ndejavu\n    dejavu = 'Deja vu'\n    dejavu = 'Deja vu'\n",
            "Line 4: Variable 'dejavu' already defined (previous definition at line 3)",
        );
    }

    #[test]
    fn builtin_redefinition() {
        given(
            "\nalpha\n    alpha = 'a'\n",
            "Line 3: 'alpha' is a built-in variable and cannot be redefined",
        );
    }

    #[test]
    fn unused_variable() {
        given(
            "\n/x/\n    x = 'x'\n    unused = 'u'\n",
            "Line 4: 'unused' is defined but not used (by its parent expression)",
        );
    }

    #[test]
    fn unclosed_literal() {
        given(
            "\nmcd = \"McDonald\n",
            "Line 2: Missing closing quote: \"McDonald",
        );
        given(
            "\nquotes_mismatch = \"'\n",
            "Line 2: Missing closing quote: \"'",
        );
    }

    #[test]
    fn zero_repeat_rejected() {
        given(
            "\n0 of alpha\n",
            "Line 2: Minimum repeat is 1 (to allow zero quantity, put it inside optional expression)",
        );
    }

    #[test]
    fn repeat_max_not_above_min() {
        given("\n3..2 of alpha\n", "Line 2: Repeat max must be greater than min");
        given("\n3..3 of alpha\n", "Line 2: Repeat max must be greater than min");
        given(
            "\n2 <<+..2 of alpha\n",
            "Line 2: Repeat max must be greater than min",
        );
    }

    #[test]
    fn of_keyword_required() {
        given(
            "\n2 off alpha\n",
            "Line 2: Expected 'of' but instead got: off",
        );
    }

    #[test]
    fn empty_character_class() {
        given(
            "\nx\n    x:\n",
            "Line 3: Empty character class is not allowed",
        );
    }

    #[test]
    fn character_class_needs_space_after_colon() {
        given(
            "\nx\n    x:abc\n",
            "Line 3: Character class definition requires space after the : (colon)",
        );
    }

    #[test]
    fn duplicate_class_item() {
        given(
            "\nx\n    x: a b a\n",
            "Line 3: Duplicate item in character class definition: a",
        );
    }

    #[test]
    fn invalid_class_keyword() {
        given(
            "\nx\n    x: ~~\n",
            "Line 3: Not a valid character class keyword: ~~",
        );
    }

    #[test]
    fn bad_code_points() {
        given(
            "\nx\n    x: U+GGGG\n",
            "Line 3: Syntax error U+GGGG should be U+hexadecimal",
        );
        given(
            "\nx\n    x: U+123456789\n",
            "Line 3: Syntax error U+123456789 out of range",
        );
    }

    #[test]
    fn bad_escape_sequence() {
        given(
            "\nx\n    x: \\q \\t\n",
            "Line 3: Bad escape sequence: \\q",
        );
    }

    #[test]
    fn character_name_must_be_uppercase() {
        given(
            "\nx\n    x: :check_mark\n",
            "Line 3: Character name must be in uppercase",
        );
    }

    #[test]
    fn set_operator_placement() {
        given(
            "\nx\n    x: a not:\n",
            "Line 3: Incorrect use of 'not:' operator",
        );
        given(
            "\nx\n    x: and a\n",
            "Line 3: Incorrect use of 'and' operator",
        );
        given(
            "\nx\n    x: a b not\n",
            "Line 3: Incorrect use of 'not' operator",
        );
    }

    #[test]
    fn invalid_character_range() {
        given(
            "\nx\n    x: +alpha..z\n",
            "Line 3: Invalid character range: +alpha..z",
        );
    }

    #[test]
    fn range_rejected_by_engine() {
        let source = "\nx\n    x: z..a\n";
        let error = compile(source)
            .unwrap_err()
            .to_string();
        assert!(
            error.starts_with(
                "Line 3: z..a compiles to z-a which is rejected by the regex engine"
            ),
            "got: {}",
            error
        );
    }

    #[test]
    fn include_errors() {
        given(
            "\nx\n    x: +ghost\n",
            "Line 3: Cannot include 'ghost': not defined",
        );
        given(
            "\nx\n    x: +word\n        word = 'word'\n",
            "Line 3: Cannot include 'word': not a character class",
        );
    }

    #[test]
    fn unused_class_definition() {
        given(
            "\nx\n    x: +vowel\n        vowel: a i u e o\n        consonant: b c d\n",
            "Line 5: 'consonant' is defined but not used (by its parent character class definition)",
        );
    }

    #[test]
    fn globalmark_placement() {
        given(
            "\nx\n*)g = 'g'\n",
            "Line 3: Indentation required after GLOBALMARK *)",
        );
        given(
            "\nx\n    x = 'a' *) y\n",
            "Line 3: Syntax error:     x = 'a' *) y",
        );
    }

    #[test]
    fn scoped_flags_reject_global_only() {
        given(
            "\nx\n    x = (unicode)\n        'aha'\n",
            "Line 3: 'unicode' is a global flag and cannot be scoped",
        );
    }

    #[test]
    fn unknown_flag() {
        given(
            "\nx\n    x = (sideways)\n        'aha'\n",
            "Line 3: Unknown flag 'sideways'",
        );
    }

    #[test]
    fn backreference_needs_capturing_group() {
        given(
            "\n/=nothing/\n",
            "Line 2: Invalid backreference: 'nothing' is not a capturing group",
        );
        given(
            "\n/word/=word/\n    word = 'w'\n",
            "Line 2: Invalid backreference: 'word' is not a capturing group",
        );
    }

    #[test]
    fn subroutine_call_needs_capturing_group() {
        given(
            "\n/&nothing/\n",
            "Line 2: Invalid subroutine call: 'nothing' is not a capturing group",
        );
    }
}
