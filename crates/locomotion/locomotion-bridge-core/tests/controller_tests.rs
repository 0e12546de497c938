use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_relative_eq;
use locomotion_bridge::{
    AnimationStateController, BasicMotor, CharacterMotor, ControllerConfig, ControllerError,
    ControllerState, FootDetector, MovementDetector, MovementEvent, ParamValue, Parameter,
    ParameterStore,
};

struct Rig {
    ctrl: AnimationStateController,
    motor: Rc<BasicMotor>,
    store: Rc<RefCell<ParameterStore>>,
    left: Rc<FootDetector>,
    right: Rc<FootDetector>,
}

impl Rig {
    fn new(config: ControllerConfig) -> Self {
        let motor = Rc::new(BasicMotor::new());
        let store = Rc::new(RefCell::new(ParameterStore::new()));
        let left = Rc::new(FootDetector::new());
        let right = Rc::new(FootDetector::new());
        let mut ctrl = AnimationStateController::builder(config)
            .motor(motor.clone())
            .sink(store.clone())
            .left_foot(left.clone())
            .right_foot(right.clone())
            .build()
            .expect("controller builds");
        ctrl.activate();
        Self {
            ctrl,
            motor,
            store,
            left,
            right,
        }
    }

    fn get(&self, param: Parameter) -> Option<ParamValue> {
        self.store.borrow().get(self.ctrl.registry().key(param))
    }

    fn float(&self, param: Parameter) -> f32 {
        match self.get(param) {
            Some(ParamValue::Float(v)) => v,
            other => panic!("{param:?}: expected float, got {other:?}"),
        }
    }

    fn flag(&self, param: Parameter) -> bool {
        match self.get(param) {
            Some(ParamValue::Bool(b)) => b,
            other => panic!("{param:?}: expected bool, got {other:?}"),
        }
    }

    fn writes_of(&self, param: Parameter) -> usize {
        let key = self.ctrl.registry().key(param);
        self.store.borrow().writes_for(key).count()
    }
}

fn strike() -> MovementEvent {
    MovementEvent {
        id: "step".into(),
        position: [0.0, 0.0, 0.0],
        normalized_speed: 0.0,
    }
}

#[test]
fn has_input_ignores_sign() {
    let mut rig = Rig::new(ControllerConfig::default());
    let cases = [
        (0.0, 0.0, false),
        (0.5, 0.0, true),
        (-0.5, 0.0, true),
        (0.0, 0.3, true),
        (0.0, -0.3, true),
        (-0.1, -0.1, true),
        (-0.0, 0.0, false),
    ];
    for (forward, lateral, expected) in cases {
        rig.motor.set_speeds(forward, lateral);
        rig.ctrl.update();
        assert_eq!(
            rig.flag(Parameter::HasInput),
            expected,
            "forward={forward} lateral={lateral}"
        );
    }
}

#[test]
fn update_passes_readings_through() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.42, -0.17);
    rig.motor.set_turning_speed(-0.66);
    rig.ctrl.update();
    assert_relative_eq!(rig.float(Parameter::ForwardSpeed), 0.42);
    assert_relative_eq!(rig.float(Parameter::LateralSpeed), -0.17);
    assert_relative_eq!(rig.float(Parameter::TurningSpeed), -0.66);
}

#[test]
fn jump_direction_lateral_dominant() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.2, 0.8);
    rig.motor.start_jump();
    assert_relative_eq!(rig.float(Parameter::JumpedLateralSpeed), 0.8);
    assert_eq!(rig.float(Parameter::JumpedForwardSpeed), 0.0);
}

#[test]
fn jump_direction_forward_dominant() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.8, 0.2);
    rig.motor.start_jump();
    assert_relative_eq!(rig.float(Parameter::JumpedForwardSpeed), 0.8);
    assert_eq!(rig.float(Parameter::JumpedLateralSpeed), 0.0);
}

#[test]
fn jump_direction_tie_prefers_forward() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.5, 0.5);
    rig.motor.start_jump();
    assert_relative_eq!(rig.float(Parameter::JumpedForwardSpeed), 0.5);
    assert_eq!(rig.float(Parameter::JumpedLateralSpeed), 0.0);
}

#[test]
fn jump_direction_compares_magnitudes() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.3, -0.9);
    rig.motor.start_jump();
    assert_relative_eq!(rig.float(Parameter::JumpedLateralSpeed), -0.9);
    assert_eq!(rig.float(Parameter::JumpedForwardSpeed), 0.0);
}

#[test]
fn jump_sets_airborne_flags() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.land();
    rig.motor.start_jump();
    assert!(rig.flag(Parameter::Jumped));
    assert!(!rig.flag(Parameter::Grounded));
    assert_eq!(rig.float(Parameter::FallTime), 0.0);
    assert_eq!(
        rig.ctrl.state(),
        ControllerState {
            is_grounded: false,
            did_jump: true
        }
    );
}

#[test]
fn landing_always_clears_jump() {
    let rig = Rig::new(ControllerConfig::default());

    // From the initial state.
    rig.motor.land();
    assert!(rig.flag(Parameter::Grounded));
    assert!(!rig.flag(Parameter::Jumped));

    // After a jump.
    rig.motor.start_jump();
    rig.motor.land();
    assert!(rig.flag(Parameter::Grounded));
    assert!(!rig.flag(Parameter::Jumped));

    // Twice in a row.
    rig.motor.land();
    assert!(rig.flag(Parameter::Grounded));
    assert!(!rig.flag(Parameter::Jumped));
    assert_eq!(
        rig.ctrl.state(),
        ControllerState {
            is_grounded: true,
            did_jump: false
        }
    );
}

#[test]
fn fall_after_jump_keeps_jumped() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.land();
    rig.motor.start_jump();
    rig.motor.start_fall(2.5);
    assert!(rig.flag(Parameter::Jumped));
    assert!(!rig.flag(Parameter::Grounded));
    assert_relative_eq!(rig.float(Parameter::PredictedFallDistance), 2.5);
    assert_eq!(rig.float(Parameter::FallTime), 0.0);
}

#[test]
fn fall_without_jump_writes_jumped_false() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.land();
    rig.motor.start_fall(1.0);
    assert!(!rig.flag(Parameter::Jumped));
    assert!(!rig.ctrl.state().did_jump);
    assert!(!rig.ctrl.state().is_grounded);
}

#[test]
fn fall_time_streams_only_while_airborne() {
    let mut rig = Rig::new(ControllerConfig::default());

    // Initial state is not grounded, so the tick writes fall time.
    rig.motor.set_fall_time(0.2);
    rig.ctrl.update();
    assert_relative_eq!(rig.float(Parameter::FallTime), 0.2);

    rig.motor.land();
    let before = rig.writes_of(Parameter::FallTime);
    rig.motor.set_fall_time(0.9);
    rig.ctrl.update();
    rig.ctrl.update();
    assert_eq!(rig.writes_of(Parameter::FallTime), before);
    assert_relative_eq!(rig.float(Parameter::FallTime), 0.2);

    rig.motor.start_fall(3.0);
    assert_eq!(rig.float(Parameter::FallTime), 0.0);
    rig.ctrl.update();
    assert_relative_eq!(rig.float(Parameter::FallTime), 0.9);
}

#[test]
fn rapid_turn_fires_trigger() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.rapid_turn(0.75);
    let key = rig.ctrl.registry().key(Parameter::RapidTurn);
    let mut store = rig.store.borrow_mut();
    assert!(store.is_trigger_set(key));
    assert!(store.consume_trigger(key));
    assert!(!store.is_trigger_set(key));
}

#[test]
fn footedness_gate_and_inversion() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.0, 0.0);
    rig.right.fire(strike());
    assert!(rig.flag(Parameter::Footedness));

    rig.motor.set_speeds(0.0, 0.5);
    rig.right.fire(strike());
    assert!(!rig.flag(Parameter::Footedness));

    rig.motor.set_speeds(0.0, 0.0);
    rig.left.fire(strike());
    assert!(!rig.flag(Parameter::Footedness));

    let inverted = Rig::new(ControllerConfig::default().with_invert_footedness(true));
    inverted.right.fire(strike());
    assert!(!inverted.flag(Parameter::Footedness));
    inverted.left.fire(strike());
    assert!(inverted.flag(Parameter::Footedness));
}

#[test]
fn footedness_ignores_forward_speed() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(1.0, 0.0);
    rig.right.fire(strike());
    assert!(rig.flag(Parameter::Footedness));
}

#[test]
fn footedness_disabled_with_single_detector() {
    let motor = Rc::new(BasicMotor::new());
    let store = Rc::new(RefCell::new(ParameterStore::new()));
    let right = Rc::new(FootDetector::new());
    let mut ctrl = AnimationStateController::builder(ControllerConfig::default())
        .motor(motor.clone())
        .sink(store.clone())
        .right_foot(right.clone())
        .build()
        .expect("missing detectors are not an error");
    ctrl.activate();

    assert!(!ctrl.footedness_enabled());
    assert_eq!(right.detection().subscriber_count(), 0);
    assert_eq!(right.fire(strike()), 0);
    let key = ctrl.registry().key(Parameter::Footedness);
    assert!(store.borrow().get(key).is_none());
}

#[test]
fn predicted_fall_distance_setter_is_idempotent() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.ctrl.set_predicted_fall_distance(4.0);
    let once = rig.get(Parameter::PredictedFallDistance);
    rig.ctrl.set_predicted_fall_distance(4.0);
    assert_eq!(rig.get(Parameter::PredictedFallDistance), once);
    assert_eq!(once, Some(ParamValue::Float(4.0)));
}

#[test]
fn predicted_fall_distance_setter_overrides_fall_start() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.motor.start_fall(2.0);
    rig.ctrl.set_predicted_fall_distance(6.0);
    assert_relative_eq!(rig.float(Parameter::PredictedFallDistance), 6.0);
    // The setter does not touch transient state.
    assert!(!rig.ctrl.state().is_grounded);
}

#[test]
fn reactivation_does_not_double_fire() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.ctrl.deactivate();
    rig.ctrl.activate();
    rig.ctrl.activate();

    assert_eq!(rig.motor.events().subscriber_count(), 4);
    assert_eq!(rig.left.detection().subscriber_count(), 1);
    assert_eq!(rig.right.detection().subscriber_count(), 1);

    rig.store.borrow_mut().drain_writes();
    rig.motor.land();
    assert_eq!(rig.writes_of(Parameter::Grounded), 1);
    assert_eq!(rig.writes_of(Parameter::Jumped), 1);

    rig.right.fire(strike());
    assert_eq!(rig.writes_of(Parameter::Footedness), 1);
}

#[test]
fn deactivated_controller_ignores_events() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.ctrl.deactivate();
    assert!(!rig.ctrl.is_active());
    assert_eq!(rig.motor.events().subscriber_count(), 0);

    rig.motor.start_jump();
    rig.right.fire(strike());
    assert!(rig.store.borrow().writes().is_empty());
    assert_eq!(rig.ctrl.state(), ControllerState::default());
}

#[test]
fn deactivate_without_activate_is_noop() {
    let motor = Rc::new(BasicMotor::new());
    let store = Rc::new(RefCell::new(ParameterStore::new()));
    let mut ctrl = AnimationStateController::builder(ControllerConfig::default())
        .motor(motor.clone())
        .sink(store)
        .build()
        .unwrap();
    ctrl.deactivate();
    ctrl.deactivate();
    assert!(!ctrl.is_active());
    assert_eq!(motor.events().subscriber_count(), 0);
}

#[test]
fn state_persists_across_activation_cycles() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.motor.land();
    rig.motor.start_jump();
    rig.ctrl.deactivate();
    rig.ctrl.activate();
    assert_eq!(
        rig.ctrl.state(),
        ControllerState {
            is_grounded: false,
            did_jump: true
        }
    );
}

#[test]
fn rapid_turn_complete_fans_out() {
    let rig = Rig::new(ControllerConfig::default());
    assert_eq!(rig.ctrl.notify_rapid_turn_complete(), 0);

    let hits = Rc::new(Cell::new(0));
    let a = Rc::clone(&hits);
    let b = Rc::clone(&hits);
    rig.ctrl.rapid_turn_complete().subscribe(move |_| a.set(a.get() + 1));
    let second = rig
        .ctrl
        .rapid_turn_complete()
        .subscribe(move |_| b.set(b.get() + 10));

    assert_eq!(rig.ctrl.notify_rapid_turn_complete(), 2);
    assert_eq!(hits.get(), 11);

    rig.ctrl.rapid_turn_complete().unsubscribe(second);
    rig.ctrl.notify_rapid_turn_complete();
    assert_eq!(hits.get(), 12);

    // Completion is a pure notification.
    assert!(rig.store.borrow().writes().is_empty());
}

#[test]
fn build_requires_motor() {
    let store = Rc::new(RefCell::new(ParameterStore::new()));
    let err = AnimationStateController::builder(ControllerConfig::default())
        .sink(store)
        .build()
        .unwrap_err();
    assert_eq!(err, ControllerError::MissingMotor);
}

#[test]
fn build_requires_sink() {
    let motor = Rc::new(BasicMotor::new());
    let err = AnimationStateController::builder(ControllerConfig::default())
        .motor(motor)
        .build()
        .unwrap_err();
    assert_eq!(err, ControllerError::MissingSink);
}

#[test]
fn build_rejects_invalid_config() {
    let motor = Rc::new(BasicMotor::new());
    let store = Rc::new(RefCell::new(ParameterStore::new()));
    let mut cfg = ControllerConfig::default();
    cfg.footedness_epsilon = f32::NAN;
    let err = AnimationStateController::builder(cfg)
        .motor(motor)
        .sink(store)
        .build()
        .unwrap_err();
    assert!(matches!(err, ControllerError::InvalidConfig { .. }));
}

#[test]
fn custom_names_reach_the_sink() {
    let cfg = ControllerConfig::default().with_parameter_name(Parameter::Grounded, "IsOnGround");
    let rig = Rig::new(cfg);
    rig.motor.land();
    let store = rig.store.borrow();
    assert_eq!(
        store.get_by_name(rig.ctrl.registry(), "IsOnGround"),
        Some(ParamValue::Bool(true))
    );
    assert_eq!(store.get_by_name(rig.ctrl.registry(), "Grounded"), None);
}

#[test]
fn handlers_read_motor_at_event_time() {
    let rig = Rig::new(ControllerConfig::default());
    rig.motor.set_speeds(0.1, 0.0);
    let reading = rig.motor.state();
    assert_eq!(reading.forward_speed, 0.1);
    rig.motor.set_speeds(0.9, 0.0);
    rig.motor.start_jump();
    assert_relative_eq!(rig.float(Parameter::JumpedForwardSpeed), 0.9);
}
