#![no_main]

use arbitrary::Arbitrary;
use holdpick_core::{
    CancelReason, CandidateList, CaptureLedger, GestureConfig, GestureController, GestureEffect,
    GestureNoopReason, PointerSample, PointerSignal, PointerSource, Rect, Size, StaticGeometry,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Start { dt: u16, mouse: bool, y: i16 },
    Move { dt: u16, mouse: bool, y: i16 },
    End { dt: u16, mouse: bool },
    Cancel { dt: u16, mouse: Option<bool>, blur: bool },
    Poll { dt: u16 },
    Teardown,
}

#[derive(Debug, Arbitrary)]
struct Input {
    candidates: u8,
    long_press_ms: u16,
    geometry: Option<(i16, i16, u16, u16)>,
    ops: Vec<Op>,
}

fn source(mouse: bool) -> PointerSource {
    if mouse { PointerSource::Mouse } else { PointerSource::Touch }
}

fuzz_target!(|input: Input| {
    let config = GestureConfig {
        long_press_ms: u64::from(input.long_press_ms.max(1)),
        ..GestureConfig::default()
    };
    let Ok(mut gc) = GestureController::<u8>::new(config) else {
        return;
    };
    let n = usize::from(input.candidates % 9);
    let list = CandidateList::new((0..n as u8).collect());
    let geometry = match input.geometry {
        Some((x, y, vw, vh)) => StaticGeometry::new(
            Rect::new(f32::from(x), f32::from(y), 44.0, 44.0),
            Size::new(f32::from(vw), f32::from(vh)),
        ),
        None => StaticGeometry::default(),
    };

    let mut now = 0_u64;
    let mut ledger = CaptureLedger::new();
    let mut disposed = false;
    for op in input.ops.iter().take(512) {
        let tr = match *op {
            Op::Start { dt, mouse, y } => {
                now += u64::from(dt);
                let sample = PointerSample::new(0.0, f32::from(y), now, source(mouse));
                gc.dispatch(&PointerSignal::Start(sample), &list, &geometry)
            }
            Op::Move { dt, mouse, y } => {
                now += u64::from(dt);
                let sample = PointerSample::new(0.0, f32::from(y), now, source(mouse));
                gc.dispatch(&PointerSignal::Move(sample), &list, &geometry)
            }
            Op::End { dt, mouse } => {
                now += u64::from(dt);
                gc.press_end(source(mouse), now, &geometry)
            }
            Op::Cancel { dt, mouse, blur } => {
                now += u64::from(dt);
                let reason = if blur { CancelReason::FocusLost } else { CancelReason::PointerCancel };
                gc.press_cancel(mouse.map(source), now, reason)
            }
            Op::Poll { dt } => {
                now += u64::from(dt);
                gc.poll_timer(now, &geometry)
            }
            Op::Teardown => {
                disposed = true;
                gc.teardown()
            }
        };

        let was_disposed = disposed && !matches!(op, Op::Teardown);
        if was_disposed {
            assert_eq!(tr.noop_reason(), Some(GestureNoopReason::Disposed));
        }
        let mut commits = 0;
        for effect in &tr.effects {
            match effect {
                GestureEffect::Capture(command) => {
                    ledger.apply(*command).expect("capture pairing");
                }
                GestureEffect::Committed { index, .. } => {
                    commits += 1;
                    assert!(*index < n, "committed index out of range");
                }
                GestureEffect::HighlightChanged { index } => {
                    assert!(*index < n, "highlight out of range");
                }
                _ => {}
            }
        }
        assert!(commits <= 1);
        assert_eq!(ledger.is_capturing(), gc.is_active());
        if let Some(index) = gc.highlighted() {
            assert!(index < n);
        }
    }
});
