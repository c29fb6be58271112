use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use shared_lib::AppConfig;
use tokio::sync::watch;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level.parse::<Level>().unwrap_or(Level::INFO))
        .init();

    info!("🚀 启动 showcase 服务...");

    let pool = database::initialize_database(config.clone())
        .await
        .wrap_err("初始化数据库失败")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 收到退出信号");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => {
                // 发送端需要一直存活，否则服务会被当作收到关闭信号
                error!("监听退出信号失败: {err}");
                std::future::pending::<()>().await;
            }
        }
    });

    web_service::start_web_service(config, pool, shutdown_rx)
        .await
        .wrap_err("Web Service 异常退出")?;

    info!("👋 服务已退出");
    Ok(())
}
