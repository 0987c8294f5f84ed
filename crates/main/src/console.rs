//! 控制台命令解析

/// 广播接收者占位符
const BROADCAST: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <name>`
    Join(String),
    /// `/leave <name>`
    Leave(String),
    /// `/who`
    Who,
    /// `<sender> <receiver|*> <text>`
    Chat {
        sender: String,
        receiver: Option<String>,
        content: String,
    },
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('/') {
        let mut parts = rest.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arguments: Vec<&str> = parts.collect();
        return match (command, arguments.as_slice()) {
            ("join", [name]) => Ok(Command::Join(name.to_string())),
            ("leave", [name]) => Ok(Command::Leave(name.to_string())),
            ("who", []) => Ok(Command::Who),
            _ => Err(format!("unknown command: /{rest}")),
        };
    }

    let mut parts = line.splitn(3, char::is_whitespace);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(sender), Some(receiver), content) if !sender.is_empty() => Ok(Command::Chat {
            sender: sender.to_string(),
            receiver: (receiver != BROADCAST).then(|| receiver.to_string()),
            content: content.unwrap_or_default().trim().to_string(),
        }),
        _ => Err("expected `<sender> <receiver|*> <text>`".to_string()),
    }
}
