use crate::{
    ast::{expressions::{Expression, Operator}, identifier::Identifier},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expression, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

/// Checks that a number token fits in 64 bits and returns it as an
/// identifier, which is how literals travel through the context.
pub fn number_identifier(token: &Token) -> Result<Identifier, Error> {
    if token.value.parse::<u64>().is_err() {
        return Err(Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        ));
    }

    Ok(Identifier::new(&token.value))
}

/// Parses `(a, 1, b)` and returns the arguments. The opening parenthesis is
/// the current token.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Identifier>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut arguments = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let token = parser.current_token().clone();
        let argument = match token.kind {
            TokenKind::Identifier => Identifier::new(&token.value),
            TokenKind::Number => number_identifier(&token)?,
            _ => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: token.value,
                        message: String::from("expected an identifier or a number as argument"),
                    },
                    token.span.start,
                ))
            }
        };
        parser.advance();
        arguments.push(argument);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(arguments)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let token = parser.advance().clone();
    let position = token.span.start.clone();

    match token.kind {
        TokenKind::Number => {
            let literal = number_identifier(&token)?;
            parser.program.basic_expression(&literal, position)
        }
        TokenKind::Identifier if parser.current_token_kind() == TokenKind::OpenParen => {
            let arguments = parse_arguments(parser)?;
            let call = parser
                .program
                .call_expression(Identifier::new(&token.value), arguments, position)?;
            Ok(Expression::Call(call))
        }
        TokenKind::Identifier => parser
            .program
            .basic_expression(&Identifier::new(&token.value), position),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken { token: token.value },
            position,
        )),
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, Error> {
    let operator_token = parser.advance().clone();
    let Some(operator) = Operator::from_symbol(&operator_token.value) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    let position = operator_token.span.start.clone();
    let right = parse_expr(parser, bp)?;

    Ok(parser
        .program
        .advanced_expression(operator, left, right, position))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}
