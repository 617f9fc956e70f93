use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use petcare_config::AppConfig;
use petcare_dispatcher::{
    CaretakerNotifier, NotificationDispatcher, ReminderSweep, SweepOutcome, TaskController,
};
use petcare_domain::repositories::{PetRepository, TaskRepository, UserRepository};
use petcare_infrastructure::{
    create_sqlite_pool, EmailChannel, SqlitePetRepository, SqliteTaskRepository,
    SqliteUserRepository, TelegramChannel,
};
use tokio::sync::broadcast;
use tracing::{error, info};

/// 主应用程序
///
/// 组装持久层、通知通道与扫描器，持有提醒循环。
pub struct Application {
    config: AppConfig,
    sweep: Arc<ReminderSweep>,
    controller: Arc<TaskController>,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let pool = create_sqlite_pool(&config.database.url, config.database.max_connections)
            .await
            .with_context(|| format!("连接数据库失败: {}", config.database.url))?;

        let task_repo: Arc<dyn TaskRepository> =
            Arc::new(SqliteTaskRepository::new(pool.clone()));
        let pet_repo: Arc<dyn PetRepository> = Arc::new(SqlitePetRepository::new(pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool));

        let email_channel = Arc::new(EmailChannel::new(
            config.email.gateway_url.clone(),
            config.email.from_address.clone(),
        ));
        let telegram_channel = Arc::new(TelegramChannel::new(
            config.telegram.api_base.clone(),
            config.telegram.bot_token.clone(),
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(email_channel, telegram_channel));

        let sweep = Arc::new(ReminderSweep::new(
            task_repo.clone(),
            pet_repo.clone(),
            user_repo.clone(),
            dispatcher.clone(),
        ));
        let caretaker_notifier = Arc::new(CaretakerNotifier::new(dispatcher));
        let controller = Arc::new(TaskController::new(
            task_repo,
            pet_repo,
            user_repo,
            caretaker_notifier,
        ));

        Ok(Self {
            config,
            sweep,
            controller,
        })
    }

    /// 任务操作入口，供外围接入层（表单、机器人回调）使用
    pub fn controller(&self) -> Arc<TaskController> {
        Arc::clone(&self.controller)
    }

    /// 运行提醒循环直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let interval = Duration::from_secs(self.config.sweep.interval_seconds);
        info!("提醒扫描循环启动，周期 {} 秒", interval.as_secs());

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // 单轮失败不终止循环，下个tick重试
                    if let Err(e) = self.sweep.run_reminder_sweep().await {
                        error!("提醒扫描执行失败: {e}");
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("提醒扫描循环收到关闭信号");
                    break;
                }
            }
        }
        Ok(())
    }

    /// 只执行一轮扫描后返回，供 --once 和运维排查使用
    pub async fn run_once(&self) -> Result<SweepOutcome> {
        let outcome = self.sweep.run_reminder_sweep().await?;
        info!(
            "单轮扫描完成: 候选 {} 个, 发送 {} 个, 失败 {} 个",
            outcome.candidates, outcome.sent, outcome.failed
        );
        Ok(outcome)
    }
}
