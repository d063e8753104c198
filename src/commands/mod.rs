pub mod power;

pub fn commands() -> Vec<crate::Command> {
    power::commands().into_iter().collect()
}
