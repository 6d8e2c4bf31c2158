use tracing::trace;

use crate::{
    ast::{identifier::Identifier, statements::AssignmentSource, value::Value},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::{number_identifier, parse_arguments, parse_expr},
    lookups::BindingPower,
    parser::Parser,
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<(), Error> {
    let token_kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&token_kind).copied() {
        return handler(parser);
    }

    if token_kind == TokenKind::Identifier {
        return match parser.peek() {
            TokenKind::Arrow => parse_var_decl_stmt(parser),
            TokenKind::Assignment => parse_assignment_stmt(parser),
            TokenKind::OpenParen => parse_call_stmt(parser),
            _ => {
                parser.advance();
                Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: parser.current_token().value.clone(),
                        message: String::from("expected `->`, `=` or `(` after identifier"),
                    },
                    parser.get_position(),
                ))
            }
        };
    }

    Err(Error::new(
        ErrorImpl::UnexpectedToken {
            token: parser.current_token().value.clone(),
        },
        parser.get_position(),
    ))
}

/// `x -> i32 = 5;`
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<(), Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::Arrow)?;
    let ty = parse_type(parser)?;

    let value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let error = Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("variables can only be initialised with a number"),
            },
            parser.get_position(),
        );
        let number = parser.expect_error(TokenKind::Number, Some(error))?;
        let literal = number_identifier(&number)?;

        Value::numeric(
            literal.literal_value().unwrap_or_default(),
            parser.program.types.get(ty).signed,
        )
    } else {
        Value::None
    };

    parser.expect(TokenKind::Semicolon)?;

    trace!(variable = %name_token.value, "declaring variable");
    parser.program.declare_variable(
        Identifier::new(&name_token.value),
        ty,
        value,
        name_token.span.start,
    )?;

    Ok(())
}

/// `x = y;`, `x = 5;` or `x = <expression>;`
pub fn parse_assignment_stmt(parser: &mut Parser) -> Result<(), Error> {
    let target_token = parser.expect(TokenKind::Identifier)?;
    let position = target_token.span.start.clone();
    parser.expect(TokenKind::Assignment)?;

    let single = matches!(
        parser.current_token_kind(),
        TokenKind::Identifier | TokenKind::Number
    ) && parser.peek() == TokenKind::Semicolon;

    let source = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else if single {
        let token = parser.advance().clone();
        Some(match token.kind {
            TokenKind::Number => {
                AssignmentSource::Literal(number_identifier(&token)?.literal_value().unwrap_or_default())
            }
            _ => AssignmentSource::Variable(
                parser
                    .program
                    .resolve_variable(&Identifier::new(&token.value), &token.span.start)?,
            ),
        })
    } else {
        Some(AssignmentSource::Expression(parse_expr(
            parser,
            BindingPower::Default,
        )?))
    };

    parser.expect(TokenKind::Semicolon)?;

    let statement =
        parser
            .program
            .assignment_statement(&Identifier::new(&target_token.value), source, position)?;
    parser.program.add_statement(statement)?;

    Ok(())
}

/// `f(a, 1);`
pub fn parse_call_stmt(parser: &mut Parser) -> Result<(), Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    let arguments = parse_arguments(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    let call = parser.program.call_expression(
        Identifier::new(&name_token.value),
        arguments,
        name_token.span.start,
    )?;
    let statement = parser.program.call_statement(call);
    parser.program.add_statement(statement)?;

    Ok(())
}

/// `return;`, `return x;` or `return 5;`
pub fn parse_return_stmt(parser: &mut Parser) -> Result<(), Error> {
    let position = parser.expect(TokenKind::Return)?.span.start;

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon => None,
        TokenKind::Number => Some(number_identifier(&parser.advance().clone())?),
        TokenKind::Identifier => Some(Identifier::new(&parser.advance().value.clone())),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("only a variable or a number can be returned"),
                },
                parser.get_position(),
            ))
        }
    };

    parser.expect(TokenKind::Semicolon)?;

    let statement = parser.program.return_statement(value.as_ref(), position)?;
    parser.program.add_statement(statement)?;

    Ok(())
}

/// Statements and declarations up to the closing brace. The opening brace
/// has already been consumed.
fn parse_block_body(parser: &mut Parser) -> Result<(), Error> {
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected `}`"),
                },
                parser.get_position(),
            ));
        }

        parse_stmt(parser)?;
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(())
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<(), Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    parser.program.enter_block(start)?;
    parse_block_body(parser)?;
    parser.program.exit_scope(parser.get_position())?;

    Ok(())
}

/// `fn name(a, b) -> i32 (i32, u8) { ... }`
///
/// The return type may be left out for a void function.
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<(), Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start;
    let name_token = parser.expect(TokenKind::Identifier)?;

    parser.expect(TokenKind::OpenParen)?;
    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let parameter = parser.expect(TokenKind::Identifier)?;
        parameters.push((Identifier::new(&parameter.value), parameter.span.start));

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    parser.expect(TokenKind::Arrow)?;
    let return_type = if parser.current_token_kind().is_type() {
        Some(parse_type(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::OpenParen)?;
    let mut parameter_types = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        parameter_types.push(parse_type(parser)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let function = parser.program.declare_function(
        Identifier::new(&name_token.value),
        parameters,
        parameter_types,
        return_type,
        name_token.span.start,
    )?;

    parser.expect(TokenKind::OpenCurly)?;
    parser.program.enter_function(function, start)?;
    parse_block_body(parser)?;
    parser.program.exit_scope(parser.get_position())?;

    Ok(())
}
