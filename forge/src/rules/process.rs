//! Spawning a shell command and reading its output.

use crate::core::capability::Constants;
use crate::core::goal::{Goal, GoalKind, int, quoted, unsat};
use crate::core::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::ProcessSpawn, "popen_call", popen_call);
    registry.add(GoalKind::ProcessSpawn, "popen_eval", popen_eval);

    registry.add(GoalKind::ProcessSpawnAndRead, "popen_read", popen_read);
    registry.add(GoalKind::ProcessSpawnAndRead, "popen_read_all", popen_read_all);
    registry.add(GoalKind::ProcessSpawnAndRead, "popen_read_eval", popen_read_eval);
}

fn command(goal: &Goal) -> Option<&str> {
    match goal {
        Goal::ProcessSpawn(cmd) | Goal::ProcessSpawnAndRead(cmd) => Some(cmd),
        _ => None,
    }
}

/// Python source spawning `cmd`.
fn popen_source(cmd: &str) -> String {
    format!("__import__('os').popen({})", quoted(cmd, '\''))
}

fn popen_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(cmd) = command(goal) else {
        return unsat();
    };
    vec![Goal::call(
        Goal::attribute(Goal::OsModule, "popen"),
        vec![Goal::string(cmd)],
    )]
}

fn popen_eval(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match command(goal) {
        Some(cmd) => vec![Goal::eval(Goal::string(popen_source(cmd)))],
        None => unsat(),
    }
}

fn read_with(goal: &Goal, args: Vec<Goal>) -> Vec<Goal> {
    let Some(cmd) = command(goal) else {
        return unsat();
    };
    let spawned = Goal::ProcessSpawn(cmd.to_string());
    vec![Goal::call(Goal::attribute(spawned, "read"), args)]
}

fn popen_read(_: &Constants, goal: &Goal) -> Vec<Goal> {
    read_with(goal, Vec::new())
}

fn popen_read_all(_: &Constants, goal: &Goal) -> Vec<Goal> {
    read_with(goal, vec![int(-1)])
}

fn popen_read_eval(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match command(goal) {
        Some(cmd) => vec![Goal::eval(Goal::string(format!(
            "{}.read()",
            popen_source(cmd)
        )))],
        None => unsat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_spawns_the_same_command() {
        let goal = Goal::ProcessSpawnAndRead("id".into());
        assert_eq!(
            popen_read(&Constants::new(), &goal),
            vec![Goal::call(
                Goal::attribute(Goal::ProcessSpawn("id".into()), "read"),
                Vec::new(),
            )]
        );
    }

    #[test]
    fn eval_source_quotes_the_command() {
        let goal = Goal::ProcessSpawnAndRead("echo 'hi'".into());
        assert_eq!(
            popen_read_eval(&Constants::new(), &goal),
            vec![Goal::eval(Goal::string(
                "__import__('os').popen('echo \\'hi\\'').read()"
            ))]
        );
        assert_eq!(popen_eval(&Constants::new(), &Goal::OsModule), unsat());
    }
}
