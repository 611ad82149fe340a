// ==========================================
// 班级课表排课系统 - 命令行入口
// ==========================================
// 用法:
//   class-timetable [--db PATH] [--role ROLE] <command> [args...]
//
// 命令:
//   current-term
//   set-current-term <term>
//   add-term <term>
//   list-terms
//   add-subject <code> <theory_hrs> <practice_hrs> [name_th] [credits]
//   list-subjects
//   delete-subject <code>
//   propose <day> <start_slot> <group> <subject|BREAK> [--teacher T] [--room R] [--term T]
//   remove <entry_id>
//   clear <group> [--term T]
//   timetable <group|teacher|room> <id> [--term T]
//
// 结果以 JSON 输出到 stdout; 日志输出到 stderr
// 排课被拒绝时退出码为 2
// ==========================================

use anyhow::{anyhow, bail, Context};
use class_timetable::app::{get_default_db_path, AppState};
use class_timetable::{
    logging, AccessPolicy, ApiError, Day, Operation, ProposeInput, Role, Subject,
};
use serde::Serialize;

const EXIT_REJECTED: i32 = 2;

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if take_switch(&mut args, "--json-log") {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = take_flag(&mut args, "--db")?.unwrap_or_else(get_default_db_path);
    let role = match take_flag(&mut args, "--role")? {
        Some(raw) => Role::parse(&raw).ok_or_else(|| anyhow!("未知角色: {}", raw))?,
        None => Role::Admin,
    };

    tracing::info!(version = class_timetable::VERSION, db_path = %db_path, role = %role, "{}", class_timetable::APP_NAME);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match run(&state, role, args) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<ApiError>().and_then(ApiError::reject_reason) {
            Some(reason) => {
                print_json(&serde_json::json!({ "rejected": reason }))?;
                std::process::exit(EXIT_REJECTED);
            }
            None => Err(err),
        },
    }
}

fn run(state: &AppState, role: Role, mut args: Vec<String>) -> anyhow::Result<()> {
    let term = take_flag(&mut args, "--term")?;
    let teacher = take_flag(&mut args, "--teacher")?;
    let room = take_flag(&mut args, "--room")?;

    let Some(command) = args.first().cloned() else {
        bail!("缺少命令, 用法见源码头部说明");
    };
    let rest = &args[1..];

    match command.as_str() {
        // ===== 学期 =====
        "current-term" => {
            AccessPolicy::authorize(role, Operation::ViewMasterData)?;
            print_json(&state.term_api.current_term()?)
        }
        "set-current-term" => {
            AccessPolicy::authorize(role, Operation::ManageTerms)?;
            let term = positional(rest, 0, "term")?;
            state.term_api.set_current_term(term)?;
            print_json(&state.term_api.current_term()?)
        }
        "add-term" => {
            AccessPolicy::authorize(role, Operation::ManageTerms)?;
            let created = state.term_api.add_term(positional(rest, 0, "term")?)?;
            print_json(&serde_json::json!({ "created": created }))
        }
        "list-terms" => {
            AccessPolicy::authorize(role, Operation::ViewMasterData)?;
            print_json(&state.term_api.list_terms()?)
        }

        // ===== 课程 =====
        "add-subject" => {
            AccessPolicy::authorize(role, Operation::ManageSubjects)?;
            let mut subject = Subject::new(
                positional(rest, 0, "code")?,
                parse_int(positional(rest, 1, "theory_hrs")?)?,
                parse_int(positional(rest, 2, "practice_hrs")?)?,
            );
            subject.name_th = rest.get(3).cloned();
            if let Some(credits) = rest.get(4) {
                subject.credits = parse_int(credits)?;
            }
            state.subject_api.upsert_subject(subject.clone())?;
            print_json(&subject)
        }
        "list-subjects" => {
            AccessPolicy::authorize(role, Operation::ViewMasterData)?;
            print_json(&state.subject_api.list_subjects()?)
        }
        "delete-subject" => {
            AccessPolicy::authorize(role, Operation::ManageSubjects)?;
            state.subject_api.delete_subject(positional(rest, 0, "code")?)?;
            print_json(&serde_json::json!({ "deleted": true }))
        }

        // ===== 排课 =====
        "propose" => {
            AccessPolicy::authorize(role, Operation::ProposeAllocation)?;
            let raw_day = positional(rest, 0, "day")?;
            let input = ProposeInput {
                day: Day::parse(raw_day).ok_or_else(|| anyhow!("非法的星期: {}", raw_day))?,
                start_slot: parse_int(positional(rest, 1, "start_slot")?)?,
                term,
                group_id: positional(rest, 2, "group")?.to_string(),
                subject_code: positional(rest, 3, "subject")?.to_string(),
                teacher_id: teacher,
                room_id: room,
            };
            print_json(&state.schedule_api.propose_allocation(input)?)
        }
        "remove" => {
            AccessPolicy::authorize(role, Operation::RemoveAllocation)?;
            let term = state
                .schedule_api
                .remove_allocation(positional(rest, 0, "entry_id")?)?;
            print_json(&serde_json::json!({ "removed": true, "term": term }))
        }
        "clear" => {
            AccessPolicy::authorize(role, Operation::ClearAllocations)?;
            let removed = state
                .schedule_api
                .clear_allocations(positional(rest, 0, "group")?, term.as_deref())?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        "timetable" => {
            AccessPolicy::authorize(role, Operation::ViewTimetable)?;
            let id = positional(rest, 1, "id")?;
            let table = match positional(rest, 0, "group|teacher|room")? {
                "group" => state.schedule_api.group_timetable(id, term.as_deref())?,
                "teacher" => state.schedule_api.teacher_timetable(id, term.as_deref())?,
                "room" => state.schedule_api.room_timetable(id, term.as_deref())?,
                other => bail!("未知的课表类型: {}", other),
            };
            print_json(&table)
        }

        other => bail!("未知命令: {}", other),
    }
}

/// 取出 `--name value` 形式的参数
fn take_flag(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(idx) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if idx + 1 >= args.len() {
        bail!("参数 {} 缺少取值", name);
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Ok(Some(value))
}

fn take_switch(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(idx) => {
            args.remove(idx);
            true
        }
        None => false,
    }
}

fn positional<'a>(rest: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    rest.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("缺少参数: {}", name))
}

fn parse_int(raw: &str) -> anyhow::Result<i32> {
    raw.trim()
        .parse::<i32>()
        .with_context(|| format!("不是整数: {}", raw))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
