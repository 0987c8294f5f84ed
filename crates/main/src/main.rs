//! 主应用程序入口
//!
//! 启动进程内聊天中继，从标准输入读取命令驱动会话。

mod console;

use std::sync::Arc;

use anyhow::Context;
use application::{
    ChannelSession, JsonEncoder, RelayService, RelayServiceDependencies, RouterSettings,
    SendMessageRequest, SessionRegistry, SystemClock,
};
use config::RelayConfig;
use console::Command;
use domain::DeliveryResult;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::load().context("加载配置失败")?;

    // 初始化日志，RUST_LOG 优先于配置
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let relay = RelayService::new(RelayServiceDependencies {
        registry: Arc::new(SessionRegistry::new()),
        clock: Arc::new(SystemClock),
        encoder: Arc::new(JsonEncoder),
        settings: RouterSettings::from(&config.delivery),
    });

    tracing::info!(
        send_timeout_ms = config.delivery.send_timeout_ms,
        session_buffer = config.delivery.session_buffer,
        "聊天中继已启动，等待命令"
    );

    let mut printers = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("读取标准输入失败")? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => handle_line(&relay, &config, &mut printers, &line).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到中断信号");
                break;
            }
        }
    }

    relay.shutdown().await;
    // 会话关闭后通道耗尽，等待剩余负载打印完
    drain_printers(&mut printers).await;
    tracing::info!("聊天中继已停止");
    Ok(())
}

async fn handle_line(
    relay: &RelayService,
    config: &RelayConfig,
    printers: &mut JoinSet<()>,
    line: &str,
) {
    let command = match console::parse(line) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    match command {
        Command::Join(name) => {
            let (session, receiver) = ChannelSession::new(config.delivery.session_buffer);
            match relay.connect(&name, Arc::new(session)).await {
                Ok(result) => {
                    spawn_printer(printers, name, receiver);
                    report(&result);
                }
                Err(err) => eprintln!("join failed: {err}"),
            }
        }
        Command::Leave(name) => match relay.disconnect(&name).await {
            Ok(Some(result)) => report(&result),
            Ok(None) => eprintln!("{name} is not connected"),
            Err(err) => eprintln!("leave failed: {err}"),
        },
        Command::Who => {
            let names: Vec<String> = relay
                .registry()
                .participants()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("online: {}", names.join(", "));
        }
        Command::Chat {
            sender,
            receiver,
            content,
        } => {
            let request = SendMessageRequest::chat(sender, receiver, content);
            match relay.send_message(request).await {
                Ok(result) => report(&result),
                Err(err) => eprintln!("rejected: {err}"),
            }
        }
    }
}

fn spawn_printer(printers: &mut JoinSet<()>, name: String, mut receiver: mpsc::Receiver<Vec<u8>>) {
    printers.spawn(async move {
        while let Some(payload) = receiver.recv().await {
            println!("[{name}] <- {}", String::from_utf8_lossy(&payload));
        }
    });
}

async fn drain_printers(printers: &mut JoinSet<()>) {
    while let Some(joined) = printers.join_next().await {
        if let Err(err) = joined {
            tracing::warn!(error = %err, "输出任务异常退出");
        }
    }
}

fn report(result: &DeliveryResult) {
    for (id, outcome) in result.iter() {
        tracing::debug!(participant_id = %id, outcome = ?outcome, "投递结果");
    }
    println!(
        "{:?} from {}: {} delivered, {} failed, {} unreachable",
        result.message().kind(),
        result.message().sender(),
        result.delivered_count(),
        result.failed_count(),
        result.unreachable_count()
    );
}
