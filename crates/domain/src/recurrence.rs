//! 重复任务的展开
//!
//! 创建时一次性把重复任务物化为每天一条的具体任务，之后不再
//! 重新展开。子任务强制 recurring=false，保证展开必然终止。

use chrono::Duration;

use crate::entities::Task;

/// 展开一个已持久化的重复任务，返回待创建的额外任务列表。
///
/// 对 `i in 1..recurring_days` 生成 N-1 条副本，原任务本身算第 0 次，
/// 与线上观察到的行为保持一致（recurring_days=N 共 N 条）。
/// 前置条件不满足时静默返回空列表，从不报错。
pub fn expand(original: &Task) -> Vec<Task> {
    if !original.recurring || original.recurring_days <= 0 {
        return Vec::new();
    }
    let Some(due) = original.due_datetime else {
        return Vec::new();
    };

    let mut occurrences = Vec::with_capacity((original.recurring_days - 1).max(0) as usize);
    for i in 1..original.recurring_days {
        let mut occurrence = Task::new(original.pet_id, original.title.clone(), original.created_by);
        occurrence.due_datetime = Some(due + Duration::days(i64::from(i)));
        occurrence.remind_me = original.remind_me;
        occurrence.remind_before = original.remind_before;
        occurrence.status = original.status;
        // 防止无限展开
        occurrence.recurring = false;
        occurrence.recurring_days = 0;
        occurrences.push(occurrence);
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RemindBefore, TaskStatus};
    use chrono::Utc;

    fn recurring_task(days: i32) -> Task {
        let mut task = Task::new(3, "早间喂药".to_string(), 11);
        task.id = 100;
        task.due_datetime = Some(Utc::now());
        task.remind_me = true;
        task.remind_before = Some(RemindBefore::OneHour);
        task.recurring = true;
        task.recurring_days = days;
        task
    }

    #[test]
    fn expands_to_n_minus_one_copies() {
        let original = recurring_task(5);
        let due = original.due_datetime.unwrap();
        let occurrences = expand(&original);

        assert_eq!(occurrences.len(), 4);
        for (index, occurrence) in occurrences.iter().enumerate() {
            let day_offset = (index + 1) as i64;
            assert_eq!(
                occurrence.due_datetime,
                Some(due + Duration::days(day_offset))
            );
            assert_eq!(occurrence.title, original.title);
            assert_eq!(occurrence.pet_id, original.pet_id);
            assert_eq!(occurrence.created_by, original.created_by);
            assert!(occurrence.remind_me);
            assert_eq!(occurrence.remind_before, Some(RemindBefore::OneHour));
            assert_eq!(occurrence.status, TaskStatus::Planned);
            assert!(!occurrence.recurring);
            assert_eq!(occurrence.recurring_days, 0);
            assert!(!occurrence.reminder_sent);
        }
    }

    #[test]
    fn single_day_recurrence_yields_nothing() {
        assert!(expand(&recurring_task(1)).is_empty());
    }

    #[test]
    fn zero_days_is_a_noop() {
        assert!(expand(&recurring_task(0)).is_empty());
    }

    #[test]
    fn missing_due_datetime_is_a_noop() {
        let mut original = recurring_task(7);
        original.due_datetime = None;
        assert!(expand(&original).is_empty());
    }

    #[test]
    fn non_recurring_task_is_a_noop() {
        let mut original = recurring_task(7);
        original.recurring = false;
        assert!(expand(&original).is_empty());
    }
}
