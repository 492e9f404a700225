//! Recursive-descent parser for the HDL grammar in §4.6. Each call to
//! [`parse`] threads a fresh `Parser` through the grammar and returns a
//! freshly built [`Chip`] — nothing is accumulated across calls.

use n2t_hdl_core::{PinRef, PinSpec};

use crate::{
    ast::{Argument, Chip, ChipCall},
    errors::ParseError,
    lexer::{Lexer, Token, TokenKind},
};

/// Parses a complete HDL chip definition.
pub fn parse(source: &str) -> Result<Chip, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_chip()
}

struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token().map_err(|e| {
            ParseError::at(source, e.offset, e.line, e.column, e.message)
        })?;
        Ok(Self { source, lexer, current })
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.source, self.current.offset, self.current.line, self.current.column, message)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token().map_err(|e| {
            ParseError::at(self.source, e.offset, e.line, e.column, e.message)
        })?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if &self.current.kind == kind {
            self.bump()
        } else {
            Err(self.error_here(format!("expected {}, found {}", kind, self.current.kind)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump()?;
                Ok(name)
            },
            other => Err(self.error_here(format!("expected identifier, found {other}"))),
        }
    }

    fn expect_number(&mut self) -> Result<u32, ParseError> {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.bump()?;
                Ok(n)
            },
            _ => Err(self.error_here(format!("expected number, found {}", self.current.kind))),
        }
    }

    fn parse_chip(&mut self) -> Result<Chip, ParseError> {
        self.expect(&TokenKind::Chip)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut parts = Vec::new();

        loop {
            match &self.current.kind {
                TokenKind::In => {
                    self.bump()?;
                    inputs.extend(self.parse_pin_decls()?);
                    self.expect(&TokenKind::Semicolon)?;
                },
                TokenKind::Out => {
                    self.bump()?;
                    outputs.extend(self.parse_pin_decls()?);
                    self.expect(&TokenKind::Semicolon)?;
                },
                TokenKind::Parts => {
                    self.bump()?;
                    self.expect(&TokenKind::Colon)?;
                    parts = self.parse_parts()?;
                },
                TokenKind::RBrace => break,
                other => {
                    return Err(self.error_here(format!(
                        "expected 'IN', 'OUT', 'PARTS' or '}}', found {other}"
                    )));
                },
            }
        }

        self.expect(&TokenKind::RBrace)?;
        log::trace!(
            "parsed chip '{name}' with {} inputs, {} outputs, {} parts",
            inputs.len(),
            outputs.len(),
            parts.len()
        );
        Ok(Chip { name, inputs, outputs, parts })
    }

    fn parse_pin_decls(&mut self) -> Result<Vec<PinSpec>, ParseError> {
        let mut decls = vec![self.parse_pin_decl()?];
        while self.current.kind == TokenKind::Comma {
            self.bump()?;
            decls.push(self.parse_pin_decl()?);
        }
        Ok(decls)
    }

    fn parse_pin_decl(&mut self) -> Result<PinSpec, ParseError> {
        let name = self.expect_ident()?;
        let size = if self.current.kind == TokenKind::LBracket {
            self.bump()?;
            let n = self.expect_number()?;
            self.expect(&TokenKind::RBracket)?;
            n
        } else {
            1
        };
        Ok(PinSpec::new(name, size))
    }

    fn parse_parts(&mut self) -> Result<Vec<ChipCall>, ParseError> {
        let mut parts = Vec::new();
        loop {
            match &self.current.kind {
                TokenKind::Ident(_) => parts.push(self.parse_part()?),
                TokenKind::RBrace => break,
                other => {
                    return Err(self.error_here(format!(
                        "expected a part invocation or '}}', found {other}"
                    )));
                },
            }
        }
        Ok(parts)
    }

    fn parse_part(&mut self) -> Result<ChipCall, ParseError> {
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if self.current.kind != TokenKind::RParen {
            arguments.push(self.parse_argument()?);
            while self.current.kind == TokenKind::Comma {
                self.bump()?;
                arguments.push(self.parse_argument()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(ChipCall { name, arguments })
    }

    fn parse_argument(&mut self) -> Result<Argument, ParseError> {
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Equals)?;
        let value = self.parse_pin_ref()?;
        Ok(Argument { name, value })
    }

    fn parse_pin_ref(&mut self) -> Result<PinRef, ParseError> {
        match &self.current.kind {
            TokenKind::True => {
                self.bump()?;
                Ok(PinRef::Constant(true))
            },
            TokenKind::False => {
                self.bump()?;
                Ok(PinRef::Constant(false))
            },
            TokenKind::Ident(_) => {
                let name = self.expect_ident()?;
                if self.current.kind == TokenKind::LBracket {
                    self.bump()?;
                    let from = self.expect_number()?;
                    let to = if self.current.kind == TokenKind::DotDot {
                        self.bump()?;
                        self.expect_number()?
                    } else {
                        from
                    };
                    self.expect(&TokenKind::RBracket)?;
                    Ok(PinRef::Slice { name, from, to })
                } else {
                    Ok(PinRef::Simple(name))
                }
            },
            other => Err(self.error_here(format!(
                "expected a pin reference, 'true' or 'false', found {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mux_chip() {
        let src = "
            CHIP Mux {
                IN a, b, sel;
                OUT out;

                PARTS:
                Nand(a=a, b=true, out=nota);
                Mux16(a=a, b=b, sel=sel, out=out);
            }
        ";
        let chip = parse(src).unwrap();
        assert_eq!(chip.name, "Mux");
        assert_eq!(chip.inputs, vec![
            PinSpec::new("a", 1),
            PinSpec::new("b", 1),
            PinSpec::new("sel", 1)
        ]);
        assert_eq!(chip.parts.len(), 2);
    }

    #[test]
    fn accepts_single_index_and_range_slices() {
        let src = "
            CHIP Slicer {
                IN bus[8];
                OUT lo, hi;
                PARTS:
                Not(in=bus[0], out=lo);
                Not16(in=bus[0..3], out=hi);
            }
        ";
        let chip = parse(src).unwrap();
        assert_eq!(chip.parts[0].arguments[0].value, PinRef::Slice { name: "bus".into(), from: 0, to: 0 });
        assert_eq!(
            chip.parts[1].arguments[0].value,
            PinRef::Slice { name: "bus".into(), from: 0, to: 3 }
        );
    }

    #[test]
    fn defaults_pin_size_to_one() {
        let chip = parse("CHIP X { IN a; OUT b; PARTS: Not(in=a, out=b); }").unwrap();
        assert_eq!(chip.inputs[0].size, 1);
    }

    #[test]
    fn reports_location_of_second_in_section() {
        let src = "CHIP Foo { IN a IN b; }";
        let err = parse(src).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.source_line, src);
        assert!(err.message.contains("IN"));
    }

    #[test]
    fn unterminated_chip_is_a_parse_error() {
        assert!(parse("CHIP Foo { IN a;").is_err());
    }
}
