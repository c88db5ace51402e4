//! Bracket notation lexer and tree builder
//!
//! The lexer turns a character stream into `(`, `)` and atom tokens, one
//! line at a time, keeping track of line and column for error reports. The
//! builder consumes one outermost group per call with an explicit stack, so
//! deeply nested trees never recurse.

use crate::error::{ParseError, ParseErrorKind, TreebankError};
use crate::label::parse_label;
use crate::pool::StringPool;
use crate::tree::{Node, NodeId};
use bstr::ByteSlice;
use memchr::memchr;
use std::io::{self, BufRead};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Open,
    Close,
    Atom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// `(line, column)` of the token's first character
    pub fn at(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

pub(crate) struct Lexer<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    line: usize,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
            line: 0,
        }
    }

    /// Current (line, column), 1-based
    pub fn position(&self) -> (usize, usize) {
        (self.line.max(1), self.pos + 1)
    }

    pub fn next_token(&mut self) -> io::Result<Option<Token>> {
        loop {
            while self.pos < self.buf.len() && self.buf[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos < self.buf.len() {
                break;
            }
            if !self.read_line()? {
                return Ok(None);
            }
        }

        let column = self.pos + 1;
        let kind = match self.buf[self.pos] {
            b'(' => {
                self.pos += 1;
                TokenKind::Open
            }
            b')' => {
                self.pos += 1;
                TokenKind::Close
            }
            _ => {
                let rest = &self.buf[self.pos..];
                let len = rest
                    .iter()
                    .position(|&b| b.is_ascii_whitespace() || b == b'(' || b == b')')
                    .unwrap_or(rest.len());
                let atom = rest[..len].to_str_lossy().into_owned();
                self.pos += len;
                TokenKind::Atom(atom)
            }
        };

        Ok(Some(Token {
            kind,
            line: self.line,
            column,
        }))
    }

    /// Skip stray text up to (not including) the next `(`
    pub fn skip_to_open(&mut self) -> io::Result<()> {
        loop {
            if let Some(offset) = memchr(b'(', &self.buf[self.pos..]) {
                self.pos += offset;
                return Ok(());
            }
            if !self.read_line()? {
                return Ok(());
            }
        }
    }

    fn read_line(&mut self) -> io::Result<bool> {
        self.buf.clear();
        self.pos = 0;
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }
}

/// Stack-based builder over a token stream
pub(crate) struct BracketParser<R> {
    lexer: Lexer<R>,
    pool: StringPool,
    unlabeled_root: Option<String>,
    // Open groups consumed and not yet closed
    depth: usize,
}

impl<R: BufRead> BracketParser<R> {
    pub fn new(reader: R, pool: StringPool, unlabeled_root: Option<String>) -> Self {
        Self {
            lexer: Lexer::new(reader),
            pool,
            unlabeled_root,
            depth: 0,
        }
    }

    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// Parse the next outermost group into an arena of nodes
    ///
    /// Returns `Ok(None)` at end of input. After a parse error the rest of
    /// the offending group is skipped, so the next call starts on the
    /// following tree.
    pub fn next_group(
        &mut self,
        file: &Arc<str>,
        tree_index: usize,
    ) -> Result<Option<Vec<Node>>, TreebankError> {
        let Some(first) = self.lexer.next_token()? else {
            return Ok(None);
        };

        match first.kind {
            TokenKind::Open => {}
            TokenKind::Close => {
                let kind = ParseErrorKind::UnexpectedClose;
                return Err(error(file, tree_index, first.at(), kind).into());
            }
            TokenKind::Atom(ref atom) => {
                let err = error(
                    file,
                    tree_index,
                    first.at(),
                    ParseErrorKind::UnexpectedAtom(atom.clone()),
                );
                self.lexer.skip_to_open()?;
                return Err(err.into());
            }
        }

        self.depth = 1;
        match self.parse_group(file, tree_index, first) {
            Ok(nodes) => Ok(Some(nodes)),
            Err(TreebankError::Parse(err)) => {
                self.recover()?;
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    // Called with the group's opening '(' already consumed
    fn parse_group(
        &mut self,
        file: &Arc<str>,
        tree_index: usize,
        first: Token,
    ) -> Result<Vec<Node>, TreebankError> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut open = first;

        'group: loop {
            // Just consumed '(' => a label must follow
            let tok = self.next_in_group(file, tree_index)?;
            match tok.kind {
                TokenKind::Atom(label) => {
                    let id = self.push_node(&mut nodes, &label, stack.last().copied());
                    let tok = self.next_in_group(file, tree_index)?;
                    let word_at = tok.at();
                    match tok.kind {
                        TokenKind::Atom(word) => {
                            let close = self.next_in_group(file, tree_index)?;
                            let close_at = close.at();
                            match close.kind {
                                TokenKind::Close => {
                                    nodes[id].word = Some(self.pool.get_or_intern(&word));
                                }
                                TokenKind::Atom(extra) => {
                                    let kind = ParseErrorKind::ExtraWord { label, extra };
                                    return Err(error(file, tree_index, close_at, kind).into());
                                }
                                TokenKind::Open => {
                                    let kind = ParseErrorKind::UnexpectedAtom(word);
                                    return Err(error(file, tree_index, word_at, kind).into());
                                }
                            }
                        }
                        TokenKind::Open => {
                            stack.push(id);
                            open = tok;
                            continue 'group;
                        }
                        TokenKind::Close => {
                            let kind = ParseErrorKind::MissingWord(label);
                            return Err(error(file, tree_index, word_at, kind).into());
                        }
                    }
                }
                TokenKind::Open if nodes.is_empty() => {
                    // `( (S ...) )`: unlabeled root, as in PTB .mrg files
                    let Some(root_label) = self.unlabeled_root.clone() else {
                        let kind = ParseErrorKind::EmptyLabel;
                        return Err(error(file, tree_index, open.at(), kind).into());
                    };
                    let id = self.push_node(&mut nodes, &root_label, None);
                    stack.push(id);
                    open = tok;
                    continue 'group;
                }
                TokenKind::Open | TokenKind::Close => {
                    let kind = ParseErrorKind::EmptyLabel;
                    return Err(error(file, tree_index, open.at(), kind).into());
                }
            }

            // A child just closed: more children, or close the parent
            loop {
                if stack.is_empty() {
                    break 'group;
                }
                let tok = self.next_in_group(file, tree_index)?;
                let at = tok.at();
                match tok.kind {
                    TokenKind::Open => {
                        open = tok;
                        continue 'group;
                    }
                    TokenKind::Close => {
                        stack.pop();
                    }
                    TokenKind::Atom(atom) => {
                        let kind = ParseErrorKind::UnexpectedAtom(atom);
                        return Err(error(file, tree_index, at, kind).into());
                    }
                }
            }
        }

        Ok(nodes)
    }

    // Next token inside an open group; end of input is an error here
    fn next_in_group(
        &mut self,
        file: &Arc<str>,
        tree_index: usize,
    ) -> Result<Token, TreebankError> {
        let Some(tok) = self.lexer.next_token()? else {
            let (line, column) = self.lexer.position();
            return Err(ParseError {
                file: file.clone(),
                tree_index,
                line,
                column,
                kind: ParseErrorKind::UnclosedGroup,
            }
            .into());
        };
        match tok.kind {
            TokenKind::Open => self.depth += 1,
            TokenKind::Close => self.depth = self.depth.saturating_sub(1),
            TokenKind::Atom(_) => {}
        }
        Ok(tok)
    }

    fn push_node(&self, nodes: &mut Vec<Node>, raw: &str, parent: Option<NodeId>) -> NodeId {
        let label = parse_label(raw);
        let function_tags = label
            .function_tags
            .iter()
            .map(|tag| self.pool.get_or_intern(tag))
            .collect();
        let empty_category = label.is_empty_category();
        let mut node = Node::new(
            self.pool.get_or_intern(raw),
            self.pool.get_or_intern(label.pos),
            function_tags,
            label.coindices,
            empty_category,
        );

        let id = nodes.len();
        if let Some(parent) = parent {
            node.parent = Some(parent);
            node.child_index = nodes[parent].children.len();
            nodes[parent].children.push(id);
        }
        nodes.push(node);
        id
    }

    // Skip the remainder of a broken group
    fn recover(&mut self) -> io::Result<()> {
        while self.depth > 0 {
            match self.lexer.next_token()? {
                None => break,
                Some(tok) => match tok.kind {
                    TokenKind::Open => self.depth += 1,
                    TokenKind::Close => self.depth -= 1,
                    TokenKind::Atom(_) => {}
                },
            }
        }
        self.depth = 0;
        Ok(())
    }
}

fn error(
    file: &Arc<str>,
    tree_index: usize,
    (line, column): (usize, usize),
    kind: ParseErrorKind,
) -> ParseError {
    ParseError {
        file: file.clone(),
        tree_index,
        line,
        column,
        kind,
    }
}
