//! One-shot transport: read a request, write a response.

use std::io::{self, Read, Write};

use serde_json::Value;

use super::{ProtocolHandler, Response, PARSE_ERROR};

/// Serve a single request and return the process exit code.
///
/// The request is `arg` when given, otherwise everything on `input`. The
/// response is written to `output` as one line of JSON.
pub fn serve<R, W>(
    arg: Option<String>,
    mut input: R,
    mut output: W,
    handler: &ProtocolHandler,
) -> io::Result<i32>
where
    R: Read,
    W: Write,
{
    let request = match arg {
        Some(request) => request,
        None => {
            let mut buf = String::new();
            match input.read_to_string(&mut buf) {
                Ok(_) => buf,
                Err(e) => {
                    tracing::error!("failed to read request: {}", e);
                    let response = Response::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: could not read request: {}", e),
                    );
                    write_response(&mut output, &response)?;
                    return Ok(response.exit_code());
                }
            }
        }
    };

    let response = handler.handle(&request);
    write_response(&mut output, &response)?;
    Ok(response.exit_code())
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    output.write_all(b"\n")?;
    output.flush()
}
