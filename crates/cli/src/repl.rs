use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use service::JsonStore;

use crate::command::{parse, Command, HELP};

const PROMPT: &[u8] = b"Enter command: ";

enum Flow {
    Continue,
    Quit,
}

/// Read-eval-print loop bound to one store and one output sink.
pub struct Repl<'a, W> {
    store: &'a JsonStore,
    out: W,
    save_on_exit: bool,
}

impl<'a, W: AsyncWrite + Unpin> Repl<'a, W> {
    pub fn new(store: &'a JsonStore, out: W, save_on_exit: bool) -> Self {
        Self { store, out, save_on_exit }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    /// Run until `exit` or end of input, then save if configured.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        self.say("Welcome to the JSON Key-Value Store CLI!").await?;
        self.say("Type 'help' for a list of commands or 'exit' to quit.").await?;

        let mut lines = input.lines();
        loop {
            self.out.write_all(PROMPT).await?;
            self.out.flush().await?;
            let Some(line) = lines.next_line().await? else {
                self.say("\nInput closed. Exiting...").await?;
                break;
            };
            if let Flow::Quit = self.execute(parse(&line)).await? {
                self.say("Exiting... Goodbye!").await?;
                break;
            }
        }

        if self.save_on_exit {
            self.save().await?;
        }
        Ok(())
    }

    async fn save(&mut self) -> io::Result<()> {
        let path = self.store.file_path().display().to_string();
        match self.store.save().await {
            Ok(()) => self.say(&format!("Store saved to {path}")).await,
            Err(e) => self.say(&format!("Error saving store: {e}")).await,
        }
    }

    async fn execute(&mut self, cmd: Command<'_>) -> io::Result<Flow> {
        debug!(?cmd, "repl command");
        match cmd {
            Command::Create { key, json } => {
                let msg = match self.store.create(key, json).await {
                    Ok(()) => format!("JSON with key '{key}' created successfully!"),
                    Err(e) => format!("Error creating JSON: {e}"),
                };
                self.say(&msg).await?;
            }
            Command::Read { key } => {
                let msg = match self.store.read(key).await {
                    Ok(json) => format!("JSON for key '{key}':\n{json}"),
                    Err(e) => format!("Error reading JSON: {e}"),
                };
                self.say(&msg).await?;
            }
            Command::Update { key, json } => {
                let msg = match self.store.update(key, json).await {
                    Ok(()) => format!("JSON with key '{key}' updated successfully!"),
                    Err(e) => format!("Error updating JSON: {e}"),
                };
                self.say(&msg).await?;
            }
            Command::Delete { key } => {
                let msg = match self.store.delete(key).await {
                    Ok(()) => format!("JSON with key '{key}' deleted successfully!"),
                    Err(e) => format!("Error deleting JSON: {e}"),
                };
                self.say(&msg).await?;
            }
            Command::List => {
                let keys = self.store.keys().await;
                if keys.is_empty() {
                    self.say("Store is empty.").await?;
                } else {
                    self.say(&keys.join("\n")).await?;
                }
            }
            Command::Save => self.save().await?,
            Command::Clear => {
                self.store.clear().await;
                self.say("All keys removed.").await?;
            }
            Command::Help => self.say(HELP).await?,
            Command::Exit => return Ok(Flow::Quit),
            Command::Empty => self.say("Invalid input. Please enter a command.").await?,
            Command::Usage(usage) => self.say(usage).await?,
            Command::Unknown => {
                self.say("Invalid command. Type 'help' for a list of available commands.").await?
            }
        }
        Ok(Flow::Continue)
    }
}
