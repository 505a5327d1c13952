//! Board image storage and link generation.

use std::path::PathBuf;

use crate::config::AgentConfig;

#[derive(Debug, Clone)]
pub struct BoardImages {
    dir: PathBuf,
    public_url: String,
}

impl BoardImages {
    pub fn new(dir: PathBuf, public_url: &str) -> Self {
        Self {
            dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.board_dir.clone(), &config.public_url)
    }

    /// Write the board and return its URL. Errors are logged and yield an empty URL.
    pub async fn save_board(&self, svg: &str, context_id: &str, task_id: &str) -> String {
        match self.write(svg, context_id, task_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(context_id, task_id, "Board image save error: {e}");
                crate::metrics::error_recorded("board_save");
                String::new()
            }
        }
    }

    async fn write(&self, svg: &str, context_id: &str, task_id: &str) -> std::io::Result<String> {
        let file_name = format!("{}-{}.svg", sanitize(context_id), sanitize(task_id));
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, svg).await?;

        if self.public_url.is_empty() {
            let absolute = std::path::absolute(&path)?;
            Ok(format!("file://{}", absolute.display()))
        } else {
            Ok(format!("{}/boards/{}", self.public_url, file_name))
        }
    }
}

/// Whether `name` has the shape `save_board` gives its files.
pub fn is_board_file(name: &str) -> bool {
    name.strip_suffix(".svg").is_some_and(|stem| {
        !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// Keep ids usable as a single path component.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
