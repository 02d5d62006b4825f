use warm_model::RunArgs;

use crate::stream::OutputStream;

/// Data carried by a triggered event.
///
/// Dispatch passes it to every observer unchanged.
#[derive(Clone, Debug, Default)]
pub enum Payload {
    /// No data; used by `preload`, `abort`, `sigint` and `quit`.
    #[default]
    Empty,
    /// Arguments and streams for a single run.
    Run(RunRequest),
}

impl Payload {
    /// Build a `run` payload.
    pub fn run(args: RunArgs, stderr: OutputStream, stdout: OutputStream) -> Self {
        Payload::Run(RunRequest::new(args, stderr, stdout))
    }

    pub fn as_run(&self) -> Option<&RunRequest> {
        match self {
            Payload::Run(req) => Some(req),
            Payload::Empty => None,
        }
    }
}

/// Positional `(args, error_stream, output_stream)` triple of a `run` event.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub args: RunArgs,
    pub stderr: OutputStream,
    pub stdout: OutputStream,
}

impl RunRequest {
    pub fn new(args: RunArgs, stderr: OutputStream, stdout: OutputStream) -> Self {
        Self {
            args,
            stderr,
            stdout,
        }
    }

    pub fn into_parts(self) -> (RunArgs, OutputStream, OutputStream) {
        (self.args, self.stderr, self.stdout)
    }
}
