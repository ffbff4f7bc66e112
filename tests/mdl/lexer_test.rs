#[cfg(test)]
mod tests {
    use cricket::mdl::{lex, LexError, Lexeme, TokenKind};

    /// Helper to collect (kind, text) pairs for an input.
    fn lexed(input: &str) -> Vec<(TokenKind, String)> {
        lex(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_arithmetic_definition() {
        assert_eq!(
            lexed("revenue - cost"),
            vec![
                (TokenKind::Identifier, "revenue".to_string()),
                (TokenKind::BinaryOperator, "-".to_string()),
                (TokenKind::Identifier, "cost".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_binary_operators() {
        assert_eq!(
            lexed("a + b - c * d / e")
                .into_iter()
                .filter(|(kind, _)| *kind == TokenKind::BinaryOperator)
                .map(|(_, text)| text)
                .collect::<Vec<_>>(),
            vec!["+", "-", "*", "/"]
        );
    }

    #[test]
    fn test_filter_operators_win_over_pipe() {
        // `||` must lex as one filter operator, never as two pipes.
        assert_eq!(
            lexed("a || b && c == d"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::FilterOperator, "||".to_string()),
                (TokenKind::Identifier, "b".to_string()),
                (TokenKind::FilterOperator, "&&".to_string()),
                (TokenKind::Identifier, "c".to_string()),
                (TokenKind::FilterOperator, "==".to_string()),
                (TokenKind::Identifier, "d".to_string()),
            ]
        );
        assert_eq!(
            lexed("clicks | us")[1],
            (TokenKind::Pipe, "|".to_string())
        );
    }

    #[test]
    fn test_full_filter_expression() {
        assert_eq!(
            lexed("impressions | (country == US)"),
            vec![
                (TokenKind::Identifier, "impressions".to_string()),
                (TokenKind::Pipe, "|".to_string()),
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::Identifier, "country".to_string()),
                (TokenKind::FilterOperator, "==".to_string()),
                (TokenKind::Identifier, "US".to_string()),
                (TokenKind::RightParen, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let tokens = lex(r#"country == "United States""#).unwrap();
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::DoubleQuotedString);
        assert_eq!(last.text, "United States");
        // Quotes are stripped from the text but counted as consumed.
        assert_eq!(last.consumed, "United States".len() + 2);

        let tokens = lex("platform == 'web'").unwrap();
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::SingleQuotedString);
        assert_eq!(last.text, "web");
        assert_eq!(last.consumed, 5);
    }

    #[test]
    fn test_offsets_account_for_quotes_and_whitespace() {
        let tokens = lex(r#""ab"  'cd' x"#).unwrap();
        assert_eq!(
            tokens
                .iter()
                .map(|t: &Lexeme| t.offset)
                .collect::<Vec<_>>(),
            vec![0, 6, 11]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lexed("7 + 2.5"),
            vec![
                (TokenKind::Number, "7".to_string()),
                (TokenKind::BinaryOperator, "+".to_string()),
                (TokenKind::Number, "2.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_dot_errors_after_the_integer_part() {
        // `100.` matches as `100`; the stray dot has no matcher.
        let err = lex("100.").unwrap_err();
        assert_eq!(
            err,
            LexError {
                position: 3,
                remainder: ".".to_string(),
            }
        );
    }

    #[test]
    fn test_leading_dot_has_no_matcher() {
        let err = lex(".5").unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.remainder, ".5");
    }

    #[test]
    fn test_error_reports_position_and_suffix() {
        let err = lex("revenue ~ cost").unwrap_err();
        assert_eq!(err.position, 8);
        assert_eq!(err.remainder, "~ cost");

        let message = err.to_string();
        assert!(message.contains("byte 8"));
        assert!(message.contains("~ cost"));
    }

    #[test]
    fn test_only_space_and_tab_are_skipped() {
        assert_eq!(lexed("a\t+ b").len(), 3);
        assert!(lex("a\n+ b").is_err());
        assert!(lex("a\r+ b").is_err());
    }

    #[test]
    fn test_minus_before_number_is_an_operator() {
        // No unary minus: `-5` is a binary operator followed by a number.
        assert_eq!(
            lexed("-5"),
            vec![
                (TokenKind::BinaryOperator, "-".to_string()),
                (TokenKind::Number, "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_identifier_shapes() {
        assert_eq!(
            lexed("dayAvg __temp_metric_0 a1_b2"),
            vec![
                (TokenKind::Identifier, "dayAvg".to_string()),
                (TokenKind::Identifier, "__temp_metric_0".to_string()),
                (TokenKind::Identifier, "a1_b2".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_and_whitespace_only_inputs() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex(" \t\t ").unwrap().is_empty());
    }
}
