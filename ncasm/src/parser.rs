use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::AsmErrorKind;
use crate::int_util::parse_int;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

/// One operand of an instruction statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand<'i> {
    Int(i64),
    Ident(&'i str),
    /// `offset(base)` — the offset defaults to zero.
    Memory { offset: i64, base: &'i str },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DirectiveArg<'i> {
    Int(i64),
    Str(&'i str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item<'i> {
    Instruction {
        mnemonic: &'i str,
        operands: Vec<Operand<'i>>,
    },
    Directive {
        name: &'i str,
        args: Vec<DirectiveArg<'i>>,
    },
}

/// A parsed source line: an optional label definition followed by an
/// optional instruction or directive.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LineStatement<'i> {
    pub label: Option<&'i str>,
    pub item: Option<Item<'i>>,
}

pub fn parse_line(text: &str) -> Result<LineStatement, AsmErrorKind> {
    let mut parsed = AsmParser::parse(Rule::line, text).map_err(|err| {
        let column = match err.line_col {
            pest::error::LineColLocation::Pos((_, col)) => col,
            pest::error::LineColLocation::Span((_, col), _) => col,
        };
        AsmErrorKind::Syntax(format!("malformed statement at column {}", column))
    })?;

    let line = parsed.next().unwrap();
    debug_assert_matches!(line.as_rule(), Rule::line);

    let mut statement = LineStatement::default();

    for pair in line.into_inner() {
        match pair.as_rule() {
            Rule::labeled => {
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::label => {
                            statement.label =
                                Some(inner.into_inner().next().unwrap().as_str());
                        }
                        Rule::directive => statement.item = Some(build_directive(inner)?),
                        Rule::instruction => statement.item = Some(build_instruction(inner)?),
                        _ => unreachable!(),
                    }
                }
            }
            Rule::directive => statement.item = Some(build_directive(pair)?),
            Rule::instruction => statement.item = Some(build_instruction(pair)?),
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    Ok(statement)
}

fn build_instruction(pair: Pair<Rule>) -> Result<Item, AsmErrorKind> {
    debug_assert_matches!(pair.as_rule(), Rule::instruction);

    let mut pairs = pair.into_inner();
    let mnemonic = pairs.next().unwrap().as_str();
    let mut operands = Vec::new();

    for operand in pairs {
        operands.push(match operand.as_rule() {
            Rule::int => Operand::Int(int_value(&operand)?),
            Rule::identifier => Operand::Ident(operand.as_str()),
            Rule::memory => {
                let mut offset = 0;
                let mut base = "";
                for part in operand.into_inner() {
                    match part.as_rule() {
                        Rule::int => offset = int_value(&part)?,
                        Rule::identifier => base = part.as_str(),
                        _ => unreachable!(),
                    }
                }
                Operand::Memory { offset, base }
            }
            _ => unreachable!(),
        });
    }

    Ok(Item::Instruction { mnemonic, operands })
}

fn build_directive(pair: Pair<Rule>) -> Result<Item, AsmErrorKind> {
    debug_assert_matches!(pair.as_rule(), Rule::directive);

    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str();
    let mut args = Vec::new();

    for arg in pairs {
        args.push(match arg.as_rule() {
            Rule::int => DirectiveArg::Int(int_value(&arg)?),
            Rule::string => DirectiveArg::Str(arg.into_inner().next().unwrap().as_str()),
            _ => unreachable!(),
        });
    }

    Ok(Item::Directive { name, args })
}

fn int_value(pair: &Pair<Rule>) -> Result<i64, AsmErrorKind> {
    parse_int(pair.as_str()).ok_or_else(|| {
        AsmErrorKind::Syntax(format!("integer literal '{}' out of range", pair.as_str()))
    })
}
