// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming JSON token writer.
//!
//! Keys and values are written in call order straight into the sink; the
//! writer only tracks where separators go. String escaping is serde_json's.

use crate::ser::primitive::Literal;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    first: bool,
}

/// Single-owner JSON generator over any [`Write`] sink.
#[derive(Debug)]
pub struct JsonWriter<W: Write> {
    out: W,
    frames: Vec<Frame>,
    /// A member name was written and waits for its value.
    after_name: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frames: Vec::with_capacity(8),
            after_name: false,
        }
    }

    fn separate(&mut self) -> io::Result<()> {
        if self.after_name {
            self.after_name = false;
            return Ok(());
        }
        if let Some(frame) = self.frames.last_mut() {
            if !frame.first {
                self.out.write_all(b",")?;
            }
            frame.first = false;
        }
        Ok(())
    }

    fn push(&mut self, kind: FrameKind, open: &[u8]) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(open)?;
        self.frames.push(Frame { kind, first: true });
        Ok(())
    }

    fn pop(&mut self, kind: FrameKind, close: &[u8]) -> io::Result<()> {
        match self.frames.pop() {
            Some(frame) if frame.kind == kind => self.out.write_all(close),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unbalanced JSON container",
            )),
        }
    }

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.push(FrameKind::Object, b"{")
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        self.pop(FrameKind::Object, b"}")
    }

    pub fn begin_array(&mut self) -> io::Result<()> {
        self.push(FrameKind::Array, b"[")
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        self.pop(FrameKind::Array, b"]")
    }

    /// Member name; the next call writes its value.
    pub fn name(&mut self, name: &str) -> io::Result<()> {
        self.separate()?;
        serde_json::to_writer(&mut self.out, name)?;
        self.out.write_all(b":")?;
        self.after_name = true;
        Ok(())
    }

    pub fn string(&mut self, value: &str) -> io::Result<()> {
        self.separate()?;
        serde_json::to_writer(&mut self.out, value)?;
        Ok(())
    }

    pub fn bool(&mut self, value: bool) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(if value { b"true" } else { b"false" })
    }

    pub fn null(&mut self) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(b"null")
    }

    /// Pre-formatted number token.
    pub fn number(&mut self, text: &str) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(text.as_bytes())
    }

    pub fn literal(&mut self, literal: &Literal) -> io::Result<()> {
        match literal {
            Literal::Null => self.null(),
            Literal::Bool(b) => self.bool(*b),
            Literal::Number(n) => self.number(n),
            Literal::String(s) => self.string(s),
        }
    }

    pub fn string_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.name(name)?;
        self.string(value)
    }

    /// `name: value` when `value` is present, nothing otherwise.
    pub fn opt_string_field(&mut self, name: &str, value: Option<&str>) -> io::Result<()> {
        match value {
            Some(v) => self.string_field(name, v),
            None => Ok(()),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
