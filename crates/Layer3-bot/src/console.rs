//! 콘솔 응답기 - 로컬 `invoke` 서브커맨드용

use async_trait::async_trait;
use pinboard_core::{InteractionResponder, Result};
use std::io::Write;

/// 응답을 표준 출력에 쓰는 responder
pub struct ConsoleResponder;

impl ConsoleResponder {
    fn print(&self, label: &str, content: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "[{}] {}", label, content)?;
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for ConsoleResponder {
    async fn reply(&self, content: &str) -> Result<()> {
        self.print("reply", content)
    }

    async fn defer(&self) -> Result<()> {
        self.print("defer", "Pinboard is thinking...")
    }

    async fn edit_reply(&self, content: &str) -> Result<()> {
        self.print("edit", content)
    }

    async fn follow_up(&self, content: &str) -> Result<()> {
        self.print("follow-up", content)
    }
}
