//! Turns program text into a `Vec<Instruction>`: label resolution and
//! relative-address rewriting happen in a finalize pass after every line
//! has been parsed.

use std::collections::HashMap;
use std::fmt;

use robots_core::instruction::Instruction;
use robots_core::value::Value;

use crate::token::{strip_comment, tokenize};

/// A malformed line of program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

fn err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError { line, message: message.into() }
}

/// Parse a complete program. Labels may be referenced before they're
/// declared; all resolution happens after every line has been read.
pub fn parse(source: &str) -> Result<Vec<Instruction>, ParseError> {
    let mut instructions: Vec<(usize, Instruction)> = Vec::new();
    let mut labels: HashMap<String, i64> = HashMap::new();

    for (lineno, raw) in source.lines().enumerate() {
        let lineno = lineno + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        if let Some(name) = text.strip_prefix(':') {
            let name = name.trim().to_string();
            if labels.contains_key(&name) {
                return Err(err(lineno, format!("duplicate label: {name}")));
            }
            labels.insert(name, instructions.len() as i64);
            continue;
        }
        instructions.push((lineno, parse_instruction(lineno, text)?));
    }

    for (idx, (lineno, instr)) in instructions.iter_mut().enumerate() {
        resolve_instruction(instr, &labels, idx as i64, *lineno)?;
    }

    Ok(instructions.into_iter().map(|(_, instr)| instr).collect())
}

fn parse_instruction(lineno: usize, text: &str) -> Result<Instruction, ParseError> {
    let tokens = tokenize(text);
    let (opcode, args) = tokens.split_first().expect("text is non-empty");
    let opcode = opcode.to_lowercase();

    let operand = |idx: usize| -> Result<Value, ParseError> {
        args.get(idx)
            .ok_or_else(|| err(lineno, format!("{opcode} expects an operand at position {idx}")))
            .and_then(|tok| parse_operand(lineno, tok))
    };
    let arity = |n: usize| -> Result<(), ParseError> {
        if args.len() == n {
            Ok(())
        } else {
            Err(err(lineno, format!("{opcode} expects {n} operand(s), got {}", args.len())))
        }
    };

    Ok(match opcode.as_str() {
        "go" => {
            arity(1)?;
            Instruction::Go { dir: operand(0)? }
        }
        "build" => {
            arity(1)?;
            Instruction::Build { dir: operand(0)? }
        }
        "jump" => {
            arity(1)?;
            Instruction::Jump { target: operand(0)? }
        }
        "fork" => {
            arity(0)?;
            Instruction::Fork
        }
        "exit" => {
            arity(0)?;
            Instruction::Exit
        }
        "if" => {
            arity(3)?;
            Instruction::If { cmp: operand(0)?, a: operand(1)?, b: operand(2)? }
        }
        "set" => {
            arity(2)?;
            Instruction::Set { dst: operand(0)?, src: operand(1)? }
        }
        "add" => {
            arity(2)?;
            Instruction::Add { dst: operand(0)?, src: operand(1)? }
        }
        "sub" => {
            arity(2)?;
            Instruction::Sub { dst: operand(0)?, src: operand(1)? }
        }
        "mul" => {
            arity(2)?;
            Instruction::Mul { dst: operand(0)?, src: operand(1)? }
        }
        "div" => {
            arity(2)?;
            Instruction::Div { dst: operand(0)?, src: operand(1)? }
        }
        "xfer" => {
            arity(3)?;
            Instruction::Xfer { dir: operand(0)?, src_idx: operand(1)?, dst_idx: operand(2)? }
        }
        "scan" => {
            arity(1)?;
            Instruction::Scan { dir: operand(0)? }
        }
        "save" => {
            arity(2)?;
            Instruction::Save { value: operand(0)?, loc: operand(1)? }
        }
        "load" => {
            arity(2)?;
            Instruction::Load { dst: operand(0)?, loc: operand(1)? }
        }
        other => return Err(err(lineno, format!("unknown opcode: {other}"))),
    })
}

fn parse_operand(lineno: usize, tok: &str) -> Result<Value, ParseError> {
    if let Some(inner) = tok.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return Ok(Value::Relative(Box::new(parse_operand(lineno, inner)?)));
    }
    if let Some(rest) = tok.strip_prefix('L') {
        return parse_index(lineno, rest).map(Value::Register);
    }
    if let Some(rest) = tok.strip_prefix('G') {
        return parse_index(lineno, rest).map(Value::Global);
    }
    if let Some(name) = tok.strip_prefix('%') {
        return Ok(Value::Variable(name.to_string()));
    }
    if let Some(name) = tok.strip_prefix('$') {
        return named_constant(lineno, name);
    }
    if let Some(name) = tok.strip_prefix(':') {
        return Ok(Value::Label(name.to_string(), -1));
    }
    tok.parse::<i64>().map(Value::Constant).map_err(|_| err(lineno, format!("not a valid operand: {tok}")))
}

fn parse_index(lineno: usize, digits: &str) -> Result<u8, ParseError> {
    digits.parse::<u8>().map_err(|_| err(lineno, format!("expected a register index, got {digits}")))
}

fn named_constant(lineno: usize, name: &str) -> Result<Value, ParseError> {
    Ok(match name {
        "up" => Value::Constant(0),
        "right" => Value::Constant(1),
        "down" => Value::Constant(2),
        "left" => Value::Constant(3),
        "success" => Value::Constant(1),
        "failure" => Value::Constant(0),
        "parent" => Value::Constant(1),
        "child" => Value::Constant(2),
        "eq" => Value::Constant(0),
        "ne" => Value::Constant(1),
        "lt" => Value::Constant(2),
        "le" => Value::Constant(3),
        "gt" => Value::Constant(4),
        "ge" => Value::Constant(5),
        "id" => Value::Identifier,
        "team" => Value::Team,
        "pc" => Value::ProgramCounter,
        other => return Err(err(lineno, format!("unknown named constant: ${other}"))),
    })
}

/// Apply a closure to every operand of an instruction.
fn for_each_value_mut(instr: &mut Instruction, mut f: impl FnMut(&mut Value)) {
    match instr {
        Instruction::Go { dir } | Instruction::Build { dir } | Instruction::Scan { dir } => f(dir),
        Instruction::Jump { target } => f(target),
        Instruction::Fork | Instruction::Exit => {}
        Instruction::If { cmp, a, b } => {
            f(cmp);
            f(a);
            f(b);
        }
        Instruction::Set { dst, src }
        | Instruction::Add { dst, src }
        | Instruction::Sub { dst, src }
        | Instruction::Mul { dst, src }
        | Instruction::Div { dst, src } => {
            f(dst);
            f(src);
        }
        Instruction::Xfer { dir, src_idx, dst_idx } => {
            f(dir);
            f(src_idx);
            f(dst_idx);
        }
        Instruction::Save { value, loc } | Instruction::Load { dst: value, loc } => {
            f(value);
            f(loc);
        }
    }
}

fn resolve_instruction(
    instr: &mut Instruction,
    labels: &HashMap<String, i64>,
    instr_index: i64,
    lineno: usize,
) -> Result<(), ParseError> {
    let mut result = Ok(());
    for_each_value_mut(instr, |value| {
        if result.is_err() {
            return;
        }
        result = resolve_value(value, labels, instr_index, false, lineno);
    });
    result
}

fn resolve_value(
    value: &mut Value,
    labels: &HashMap<String, i64>,
    instr_index: i64,
    relative: bool,
    lineno: usize,
) -> Result<(), ParseError> {
    match value {
        Value::Label(name, target) => {
            let absolute = *labels.get(name).ok_or_else(|| err(lineno, format!("undeclared label: {name}")))?;
            *target = if relative { absolute - instr_index } else { absolute };
            Ok(())
        }
        Value::Relative(inner) => resolve_value(inner, labels, instr_index, true, lineno),
        _ => Ok(()),
    }
}
