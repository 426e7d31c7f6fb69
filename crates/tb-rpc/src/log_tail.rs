//! Following a tank's debug log on disk.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use shared_types::{LogLines, NodeError};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

struct Tail {
    path: PathBuf,
    reader: BufReader<File>,
    pending: String,
    poll: Duration,
}

impl Tail {
    /// Next complete line. Partial lines wait for their newline.
    async fn next_line(&mut self) -> Result<String, NodeError> {
        loop {
            let read = self
                .reader
                .read_line(&mut self.pending)
                .await
                .map_err(|e| NodeError::Transport(format!("{}: {e}", self.path.display())))?;
            if read == 0 {
                tokio::time::sleep(self.poll).await;
                continue;
            }
            if self.pending.ends_with('\n') {
                let line = std::mem::take(&mut self.pending);
                return Ok(line.trim_end_matches(['\r', '\n']).to_string());
            }
        }
    }
}

/// Lines appended to `path` from now on. The stream ends after the first
/// read error.
pub async fn follow(path: &Path, poll: Duration) -> Result<LogLines, NodeError> {
    let open_error = |e: std::io::Error| NodeError::Transport(format!("{}: {e}", path.display()));
    let mut file = File::open(path).await.map_err(open_error)?;
    file.seek(SeekFrom::End(0)).await.map_err(open_error)?;

    let tail = Tail {
        path: path.to_path_buf(),
        reader: BufReader::new(file),
        pending: String::new(),
        poll,
    };

    let lines = stream::unfold(Some(tail), |tail| async move {
        let mut tail = tail?;
        match tail.next_line().await {
            Ok(line) => Some((Ok(line), Some(tail))),
            Err(e) => Some((Err(e), None)),
        }
    });
    Ok(lines.boxed())
}
