//! Scripted `CommandRunner` shared by the adapter tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

use shadow_toolchain::{CommandOutput, CommandRunner, RunError};

pub enum Reply {
    Ok(&'static str),
    Fail(i32, &'static str),
    Missing,
}

/// Answers each call with the next scripted reply and records the arguments.
#[derive(Default)]
pub struct FakeRunner {
    replies: RefCell<VecDeque<Reply>>,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeRunner {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            calls: RefCell::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn args(&self, index: usize) -> Vec<String> {
        self.calls.borrow()[index].1.clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String], _cwd: &Path) -> Result<CommandOutput, RunError> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Ok(stdout)) => Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
            Some(Reply::Fail(code, stderr)) => Ok(CommandOutput {
                success: false,
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
            Some(Reply::Missing) => Err(RunError::NotFound {
                program: program.to_string(),
            }),
            None => panic!("unexpected extra call: {program} {args:?}"),
        }
    }
}
