//! 提醒时间窗口计算
//!
//! 窗口是半开区间 [reminder_instant, due_datetime)：早于下界尚未到
//! 提醒时间，到达上界视为已到期，交给过期处理而不再走提醒。

use chrono::{DateTime, Duration, Utc};

use crate::entities::{RemindBefore, Task};

/// 提前量时长；未设置视为 0，即提醒时刻等于到期时刻
pub fn lead_time(remind_before: Option<RemindBefore>) -> Duration {
    remind_before.map(|r| r.lead_time()).unwrap_or_else(Duration::zero)
}

/// 提醒应当触发的时刻；无到期时间的任务没有提醒时刻
pub fn reminder_instant(task: &Task) -> Option<DateTime<Utc>> {
    task.due_datetime.map(|due| due - lead_time(task.remind_before))
}

/// 当前时刻是否落在任务的提醒窗口内
pub fn is_in_reminder_window(task: &Task, now: DateTime<Utc>) -> bool {
    let Some(due) = task.due_datetime else {
        return false;
    };
    let Some(instant) = reminder_instant(task) else {
        return false;
    };
    instant <= now && now < due
}
