//! Scenario tests driving `ControlCore::tick` end to end against a hand-fed
//! `IronDeps` fixture, covering the sequencing and cross-module interactions
//! that the per-module unit tests can't exercise alone.

use core::sync::atomic::{AtomicU32, Ordering};
use iron_core::error::FatalError;
use iron_core::ports::*;
use iron_core::{timers, ControlCore, FailState, Millis, Mode, Profile, ProfileId, SystemSettings};

#[derive(Default)]
struct TestDeps {
    tip_t: u16,
    avg_adc: u16,
    raw_avg: u16,
    cold_junction_x10: i16,
    supply_v_x10: u32,
    pid_output: f32,
    compare: u16,
    saves: u32,
    short_beeps: u32,
    long_beeps: u32,
    alarms_started: u32,
    alarms_stopped: u32,
    fatal: Option<FatalError>,
    sys_checksum: u32,
    tip_checksum: u32,
}

impl TipSensor for TestDeps {
    fn read_compensated(&mut self, _update: bool, _avg: AvgMode) -> u16 {
        self.tip_t
    }
    fn read_avg_adc(&mut self) -> u16 {
        self.avg_adc
    }
    fn read_raw_avg(&mut self) -> u16 {
        self.raw_avg
    }
}

impl ColdJunction for TestDeps {
    fn read_x10(&mut self, _unit: iron_core::TempUnit) -> i16 {
        self.cold_junction_x10
    }
}

impl SupplyVoltage for TestDeps {
    fn read_v_x10(&mut self) -> u32 {
        self.supply_v_x10
    }
}

impl PidCompute for TestDeps {
    fn compute(&mut self, _setpoint_adc: u16, _measured_adc: u16) -> f32 {
        self.pid_output
    }
}

impl UnitConvert for TestDeps {
    fn human_to_adc(&self, temperature: u16, _unit: iron_core::TempUnit) -> u16 {
        temperature
    }
    fn convert(&self, temperature: u16, _from: iron_core::TempUnit, _to: iron_core::TempUnit) -> u16 {
        temperature
    }
}

impl ChecksumSource for TestDeps {
    fn checksum_settings(&self, _settings: &SystemSettings) -> u32 {
        self.sys_checksum
    }
    fn checksum_profile(&self, _profile: &Profile) -> u32 {
        self.tip_checksum
    }
}

impl SettingsPersist for TestDeps {
    fn save(&mut self, _mode: SaveMode) {
        self.saves += 1;
    }
}

impl Buzzer for TestDeps {
    fn short_beep(&mut self) {
        self.short_beeps += 1;
    }
    fn long_beep(&mut self) {
        self.long_beeps += 1;
    }
    fn alarm_start(&mut self) {
        self.alarms_started += 1;
    }
    fn alarm_stop(&mut self) {
        self.alarms_stopped += 1;
    }
}

impl PwmTimer for TestDeps {
    fn set_autoreload(&mut self, _pwm_period: u16, _pwm_delay: u16) {}
    fn set_compare(&mut self, duty: u16) {
        self.compare = duty;
    }
    fn start(&mut self, _complementary: bool) {}
}

impl FatalSink for TestDeps {
    fn fatal(&mut self, err: FatalError) {
        self.fatal = Some(err);
    }
}

fn booted_core(profile: Profile, settings: SystemSettings) -> ControlCore {
    let mut core = ControlCore::new(profile, settings);
    core.state.pwm_limit = timers::pwm_limit(core.profile.pwm_period, core.profile.pwm_delay);
    core
}

fn present_deps() -> TestDeps {
    TestDeps {
        raw_avg: 100,
        cold_junction_x10: 250,
        supply_v_x10: 120,
        ..Default::default()
    }
}

#[test]
fn fail_state_zeroes_power_and_holds_pwm_off() {
    let mut core = booted_core(Profile::default(), SystemSettings::default());
    let mut deps = present_deps();
    core.set_fail_state(FailState::On, &mut deps);

    core.tick(Millis(1000), &mut deps);

    assert_eq!(core.get_current_power(), -99);
    assert_eq!(deps.compare, 0);
}

#[test]
fn tip_removal_forces_sleep_and_sounds_alarm() {
    let profile = Profile::default();
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);

    // Raw average above `no_iron_value` means the tip is gone.
    deps.raw_avg = core.profile.no_iron_value + 1;
    core.tick(Millis(500), &mut deps);

    assert!(!core.get_iron_presence());
    assert_eq!(core.get_current_mode(), Mode::Sleep);
    assert_eq!(core.get_current_power(), -99);
    assert_eq!(deps.alarms_started, 1);
}

#[test]
fn setpoint_reached_callback_fires_within_band() {
    static REACHED: AtomicU32 = AtomicU32::new(0);
    fn on_reached(t: u16) {
        REACHED.store(t as u32, Ordering::SeqCst);
    }
    REACHED.store(0, Ordering::SeqCst);

    let profile = Profile {
        user_setpoint: 300,
        ..Default::default()
    };
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    core.add_setpoint_reached_callback(on_reached).unwrap();

    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);
    deps.tip_t = 301;
    deps.avg_adc = 500;
    deps.pid_output = 0.5;

    core.tick(Millis(1000), &mut deps);

    assert_eq!(REACHED.load(Ordering::SeqCst), 301);
}

#[test]
fn stand_switch_mode_change_is_debounced() {
    let profile = Profile::default();
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);

    core.set_mode_from_stand(Mode::Sleep, Millis(2000));

    // Still within the 500ms debounce window: mode hasn't changed yet.
    core.tick(Millis(2100), &mut deps);
    assert_eq!(core.get_current_mode(), Mode::Run);

    // Past the debounce window: the pending change applies.
    core.tick(Millis(2600), &mut deps);
    assert_eq!(core.get_current_mode(), Mode::Sleep);
}

#[test]
fn sleep_timeout_forces_sleep_and_long_beeps() {
    let profile = Profile {
        sleep_timeout_min: 10,
        ..Default::default()
    };
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);

    core.tick(Millis(600_001), &mut deps);

    assert_eq!(core.get_current_mode(), Mode::Sleep);
    assert_eq!(deps.long_beeps, 1);
}

#[test]
fn sustained_overshoot_trips_runaway_after_its_time_window() {
    let profile = Profile {
        user_setpoint: 300,
        pid_tick_period_ms: 200,
        ..Default::default()
    };
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);

    // 401 is 101 over setpoint 300: past the L100 threshold (4 * 25 = 100).
    deps.tip_t = 401;
    deps.avg_adc = 401;
    deps.pid_output = 0.5;

    core.tick(Millis(1000), &mut deps);
    assert!(deps.fatal.is_none());

    // L100's window is 1000ms; 1300ms later it trips.
    core.tick(Millis(2300), &mut deps);

    assert_eq!(deps.fatal, Some(FatalError::Runaway100));
    assert_eq!(deps.compare, 0);
}

#[test]
fn dirtied_settings_save_after_the_debounce_delay() {
    let profile = Profile::default();
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        save_settings_delay_s: 3,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();

    deps.sys_checksum = 111;
    core.tick(Millis(1000), &mut deps);
    assert_eq!(deps.saves, 0);

    core.tick(Millis(2100), &mut deps);
    assert_eq!(deps.saves, 0);

    core.tick(Millis(4200), &mut deps);
    assert_eq!(deps.saves, 1);
}

#[test]
fn pwm_output_never_exceeds_the_adc_window_limit() {
    let profile = Profile {
        user_setpoint: 300,
        ..Default::default()
    };
    let settings = SystemSettings {
        current_profile: ProfileId::T12,
        ..Default::default()
    };
    let mut core = booted_core(profile, settings);
    let mut deps = present_deps();
    core.set_current_mode(Mode::Run, true, Millis(0), &mut deps);

    deps.tip_t = 250;
    deps.avg_adc = 250;
    deps.pid_output = 1.0;

    core.tick(Millis(1000), &mut deps);

    assert!(deps.fatal.is_none());
    assert!(core.state.pwm_out <= core.state.pwm_limit);
    assert_eq!(deps.compare, core.state.pwm_out);
}
