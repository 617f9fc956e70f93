use chrono::{DateTime, Duration, FixedOffset, Utc};
use petcare_errors::{PetcareError, PetcareResult};
use serde::{Deserialize, Serialize};

/// 护理任务状态
///
/// planned/overdue 为活跃状态，done/skipped 为终态，终态之间不允许再变更。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "planned")]
    Planned,
    #[serde(rename = "overdue")]
    Overdue,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "skipped")]
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Planned => "planned",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Done => "done",
            TaskStatus::Skipped => "skipped",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(TaskStatus::Planned),
            "overdue" => Some(TaskStatus::Overdue),
            "done" => Some(TaskStatus::Done),
            "skipped" => Some(TaskStatus::Skipped),
            _ => None,
        }
    }
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Planned | TaskStatus::Overdue)
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Skipped)
    }
}

impl sqlx::Type<sqlx::Sqlite> for TaskStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TaskStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        TaskStatus::parse(s).ok_or_else(|| format!("无效的任务状态: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TaskStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 提醒提前量，固定的枚举集合
///
/// 落库值与 `15_min` 等字符串保持一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemindBefore {
    #[serde(rename = "15_min")]
    FifteenMin,
    #[serde(rename = "1_hour")]
    OneHour,
    #[serde(rename = "4_hours")]
    FourHours,
    #[serde(rename = "12_hours")]
    TwelveHours,
    #[serde(rename = "1_day")]
    OneDay,
    #[serde(rename = "3_days")]
    ThreeDays,
    #[serde(rename = "1_week")]
    OneWeek,
}

impl RemindBefore {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemindBefore::FifteenMin => "15_min",
            RemindBefore::OneHour => "1_hour",
            RemindBefore::FourHours => "4_hours",
            RemindBefore::TwelveHours => "12_hours",
            RemindBefore::OneDay => "1_day",
            RemindBefore::ThreeDays => "3_days",
            RemindBefore::OneWeek => "1_week",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "15_min" => Some(RemindBefore::FifteenMin),
            "1_hour" => Some(RemindBefore::OneHour),
            "4_hours" => Some(RemindBefore::FourHours),
            "12_hours" => Some(RemindBefore::TwelveHours),
            "1_day" => Some(RemindBefore::OneDay),
            "3_days" => Some(RemindBefore::ThreeDays),
            "1_week" => Some(RemindBefore::OneWeek),
            _ => None,
        }
    }
    /// 提前量对应的时长
    pub fn lead_time(&self) -> Duration {
        match self {
            RemindBefore::FifteenMin => Duration::minutes(15),
            RemindBefore::OneHour => Duration::hours(1),
            RemindBefore::FourHours => Duration::hours(4),
            RemindBefore::TwelveHours => Duration::hours(12),
            RemindBefore::OneDay => Duration::days(1),
            RemindBefore::ThreeDays => Duration::days(3),
            RemindBefore::OneWeek => Duration::weeks(1),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for RemindBefore {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for RemindBefore {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        RemindBefore::parse(s).ok_or_else(|| format!("无效的提醒提前量: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for RemindBefore {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 提醒实际走的通道，发送成功后落库到 reminder_sent_with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReminderChannel {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "telegram")]
    Telegram,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Telegram => "telegram",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(ReminderChannel::Email),
            "telegram" => Some(ReminderChannel::Telegram),
            _ => None,
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for ReminderChannel {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ReminderChannel {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        ReminderChannel::parse(s).ok_or_else(|| format!("无效的提醒通道: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ReminderChannel {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 用户偏好的联系方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommunicationMethod {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "telegram")]
    Telegram,
}

impl CommunicationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationMethod::Email => "email",
            CommunicationMethod::Telegram => "telegram",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(CommunicationMethod::Email),
            "telegram" => Some(CommunicationMethod::Telegram),
            _ => None,
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for CommunicationMethod {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for CommunicationMethod {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        CommunicationMethod::parse(s).ok_or_else(|| format!("无效的联系方式: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for CommunicationMethod {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 护理任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub pet_id: i64,
    pub title: String,
    /// 到期时间；为空的任务永远不会进入提醒扫描
    pub due_datetime: Option<DateTime<Utc>>,
    pub remind_me: bool,
    pub remind_before: Option<RemindBefore>,
    pub status: TaskStatus,
    pub recurring: bool,
    pub recurring_days: i32,
    /// 单向标志，一旦置位不再复位
    pub reminder_sent: bool,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub reminder_sent_with: Option<ReminderChannel>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<i64>,
    pub skipped_at: Option<DateTime<Utc>>,
    pub skipped_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: i64,
    pub updated_at: DateTime<Utc>,
    /// 软删除：非空即视为已删除，永不物理删除
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

impl Task {
    pub fn new(pet_id: i64, title: String, created_by: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 将由数据库生成
            pet_id,
            title,
            due_datetime: None,
            remind_me: false,
            remind_before: None,
            status: TaskStatus::Planned,
            recurring: false,
            recurring_days: 0,
            reminder_sent: false,
            reminder_sent_at: None,
            reminder_sent_with: None,
            completed_at: None,
            completed_by: None,
            skipped_at: None,
            skipped_by: None,
            created_at: now,
            created_by,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn ensure_updatable(&self) -> PetcareResult<()> {
        if self.is_deleted() {
            return Err(PetcareError::TaskDeleted { id: self.id });
        }
        if !self.status.is_active() {
            return Err(PetcareError::invalid_transition(self.id, self.status.as_str()));
        }
        Ok(())
    }

    /// 标记完成。仅允许 planned/overdue 且未删除的任务。
    pub fn mark_as_done(&mut self, actor_id: i64) -> PetcareResult<()> {
        self.ensure_updatable()?;
        let now = Utc::now();
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        self.completed_by = Some(actor_id);
        self.updated_at = now;
        Ok(())
    }

    /// 标记跳过，约束与 mark_as_done 对称
    pub fn mark_as_skipped(&mut self, actor_id: i64) -> PetcareResult<()> {
        self.ensure_updatable()?;
        let now = Utc::now();
        self.status = TaskStatus::Skipped;
        self.skipped_at = Some(now);
        self.skipped_by = Some(actor_id);
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_as_reminded_via_email(&mut self) {
        self.mark_as_reminded(ReminderChannel::Email);
    }

    pub fn mark_as_reminded_via_telegram(&mut self) {
        self.mark_as_reminded(ReminderChannel::Telegram);
    }

    fn mark_as_reminded(&mut self, channel: ReminderChannel) {
        let now = Utc::now();
        self.reminder_sent = true;
        self.reminder_sent_at = Some(now);
        self.reminder_sent_with = Some(channel);
        self.updated_at = now;
    }

    pub fn mark_as_deleted(&mut self, actor_id: i64) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor_id);
        self.updated_at = now;
    }

    pub fn entity_description(&self) -> String {
        format!(
            "任务 '{}' (ID: {}, 状态: {})",
            self.title,
            self.id,
            self.status.as_str()
        )
    }
}

/// 宠物，本引擎只读取 owner/caregiver 关系
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub caregiver_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    /// 提醒接收人：有照护人发给照护人，否则发给主人
    pub fn reminder_recipient_id(&self) -> i64 {
        self.caregiver_id.unwrap_or(self.owner_id)
    }
}

/// 用户，本引擎只读取联系方式与时区偏好
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub communication_method: CommunicationMethod,
    /// UTC偏移字符串，如 "+03:00"；解析失败回退UTC
    pub preferred_timezone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn utc_offset(&self) -> FixedOffset {
        self.preferred_timezone
            .as_deref()
            .and_then(|s| s.parse::<FixedOffset>().ok())
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("零偏移总是有效"))
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = self.first_name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        if let Some(email) = self.email.as_deref() {
            return email.to_string();
        }
        format!("user#{}", self.id)
    }
}
