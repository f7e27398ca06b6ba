//! JSON-lines method channel.
//!
//! One request per line in, one response per line out:
//!
//! ```text
//! {"id":1,"method":"encrypt","arguments":{"tag":"t","data":"x"}}
//! {"id":1,"status":"success","result":"<base64>"}
//! ```
//!
//! Requests are handled strictly one after another.

use biocipher_service::{ErrorCode, MethodResult, RequestFacade};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// One response line.
#[derive(Debug, Serialize)]
pub struct Response {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: MethodResult,
}

/// Handle one raw request line.
pub async fn handle_line(facade: &RequestFacade, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            let outcome = facade
                .handle(&request.method, request.arguments.as_ref())
                .await;
            Response {
                id: request.id,
                outcome,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed request line");
            Response {
                id: Value::Null,
                outcome: MethodResult::Error {
                    code: ErrorCode::InvalidArgument,
                    message: format!("malformed request: {e}"),
                },
            }
        }
    }
}

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
pub async fn serve<R, W>(facade: &RequestFacade, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(facade, &line).await;
        let mut out = serde_json::to_vec(&response)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    tracing::info!("request stream closed");
    Ok(())
}
