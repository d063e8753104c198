mod list_power;
mod my_power;
mod remove_power;
mod set_power;
pub mod util;

pub fn commands() -> [crate::Command; 4] {
    [
        set_power::set_power(),
        my_power::my_power(),
        list_power::list_power(),
        remove_power::remove_power(),
    ]
}
