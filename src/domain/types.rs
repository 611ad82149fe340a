// ==========================================
// 班级课表排课系统 - 领域类型定义
// ==========================================
// 职责: 星期、资源维度等封闭枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 星期 (Day)
// ==========================================
// 红线: 只允许周一至周五 5 个取值
// 序列化格式: 英文全称 (与数据库一致, 如 "Monday")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// 一周全部教学日（按顺序）
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// 从字符串解析（大小写不敏感）
    ///
    /// # 返回
    /// - Some(Day): 合法的教学日
    /// - None: 非法取值（含周六/周日）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(Day::Monday),
            "tuesday" | "tue" => Some(Day::Tuesday),
            "wednesday" | "wed" => Some(Day::Wednesday),
            "thursday" | "thu" => Some(Day::Thursday),
            "friday" | "fri" => Some(Day::Friday),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 资源维度 (Resource Axis)
// ==========================================
// 冲突判定的三个独立维度; 班级维度永远存在
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceAxis {
    Teacher, // 教师
    Room,    // 教室
    Group,   // 班级
}

impl fmt::Display for ResourceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceAxis::Teacher => write!(f, "TEACHER"),
            ResourceAxis::Room => write!(f, "ROOM"),
            ResourceAxis::Group => write!(f, "GROUP"),
        }
    }
}
