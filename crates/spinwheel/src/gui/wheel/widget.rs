use super::DEFAULT_SIZE;
use super::animation::{Animator, SpinFrame, SpinPlan, SpinSettings};
use super::model::{Viewport, WheelState};
use super::overlay::ResultCard;
use super::view::{Quality, WheelRenderer};
use crate::gui::theme::{self, ThemeColors};
use cairo::Context;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgb;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;
use wheelkit::model::Entry;

type SpinCallback = Box<dyn FnOnce(Entry)>;

enum TickOutcome {
    Idle,
    Running,
    Finished(Option<(Entry, SpinCallback)>),
}

struct Inner {
    state: WheelState,
    renderer: WheelRenderer,
    animator: Animator,
    settings: SpinSettings,
    quality: Quality,
    overlay: Option<ResultCard>,
    tick: Option<gtk::TickCallbackId>,
    on_complete: Option<SpinCallback>,
}

impl Inner {
    fn rebuild(&mut self) {
        if let Err(e) = self
            .renderer
            .rebuild(&self.state.entries, self.state.viewport)
        {
            log::error!("Failed to render wheel: {}", e);
        }
    }

    /// Accepts a spin unless one is running or nothing can win.
    fn begin(&mut self, plan: SpinPlan, now: Instant, on_complete: SpinCallback) -> bool {
        if !self.state.can_spin() || !self.animator.start(plan, now) {
            return false;
        }
        self.on_complete = Some(on_complete);
        self.overlay = None;
        true
    }

    fn advance(&mut self, now: Instant) -> TickOutcome {
        let Some(frame) = self.animator.advance(now) else {
            self.tick = None;
            return TickOutcome::Idle;
        };
        self.state.set_angle(frame.angle());
        match frame {
            SpinFrame::InFlight(_) => {
                self.quality = Quality::Fast;
                TickOutcome::Running
            }
            SpinFrame::Finished(_) => {
                self.quality = Quality::High;
                self.tick = None;
                let winner = self.state.winner().cloned();
                if winner.is_none() {
                    log::warn!("Spin ended without any weighted entries");
                }
                TickOutcome::Finished(winner.zip(self.on_complete.take()))
            }
        }
    }

    fn cancel(&mut self) {
        if self.animator.cancel() {
            log::debug!("Spin cancelled at {:.1} degrees", self.state.angle);
        }
        self.on_complete = None;
        self.quality = Quality::High;
        if let Some(id) = self.tick.take() {
            id.remove();
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        theme::set_source(cr, colors.background);
        cr.paint()?;
        self.renderer.paint(cr, self.state.angle, self.quality)?;
        if let Some(card) = &self.overlay {
            card.draw(cr, self.state.viewport, colors, self.renderer.font_family())?;
        }
        Ok(())
    }
}

/// The wheel component. Entries, angle and spin state are private; the
/// shell drives it through the methods below.
pub struct WheelWidget {
    area: gtk::DrawingArea,
    inner: Rc<RefCell<Inner>>,
}

impl WheelWidget {
    pub fn new(settings: SpinSettings, font_family: &str) -> Self {
        let viewport = Viewport::new(DEFAULT_SIZE, DEFAULT_SIZE);
        let area = gtk::DrawingArea::builder()
            .content_width(DEFAULT_SIZE)
            .content_height(DEFAULT_SIZE)
            .hexpand(true)
            .vexpand(true)
            .build();

        let inner = Rc::new(RefCell::new(Inner {
            state: WheelState::new(viewport),
            renderer: WheelRenderer::new(viewport, font_family),
            animator: Animator::default(),
            settings,
            quality: Quality::High,
            overlay: None,
            tick: None,
            on_complete: None,
        }));
        inner.borrow_mut().rebuild();

        Self::connect_signals(&area, Rc::downgrade(&inner));
        Self { area, inner }
    }

    fn connect_signals(area: &gtk::DrawingArea, weak: Weak<RefCell<Inner>>) {
        let draw_ref = weak.clone();
        area.set_draw_func(move |area, cr, _, _| {
            let Some(inner) = draw_ref.upgrade() else {
                return;
            };
            let colors = ThemeColors::from_widget(area);
            if let Err(e) = inner.borrow().draw(cr, &colors) {
                log::error!("Drawing error: {}", e);
            }
        });

        let resize_ref = weak.clone();
        area.connect_resize(move |_, width, height| {
            if let Some(inner) = resize_ref.upgrade() {
                let mut inner = inner.borrow_mut();
                let viewport = Viewport::new(width, height);
                if inner.state.viewport != viewport {
                    inner.state.viewport = viewport;
                    inner.rebuild();
                }
            }
        });

        let click = gtk::GestureClick::new();
        let click_ref = weak.clone();
        let click_area = area.downgrade();
        click.connect_released(move |_, _, _, _| {
            let dismissed = click_ref
                .upgrade()
                .is_some_and(|inner| inner.borrow_mut().overlay.take().is_some());
            if dismissed && let Some(area) = click_area.upgrade() {
                area.queue_draw();
            }
        });
        area.add_controller(click);

        area.connect_unrealize(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().cancel();
            }
        });
    }

    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.area
    }

    /// Replaces the entries and re-renders. The rotation angle is kept.
    pub fn set_entries(&self, entries: Vec<Entry>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.state.set_entries(entries);
            inner.rebuild();
        }
        self.area.queue_draw();
    }

    /// Starts a spin; `on_complete` runs once with the winner when it stops.
    /// Ignored, returning false, while spinning or with nothing to pick.
    pub fn spin(&self, on_complete: impl FnOnce(Entry) + 'static) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            let plan = SpinPlan::random(&mut rand::thread_rng(), inner.state.angle, &inner.settings);
            if !inner.begin(plan, Instant::now(), Box::new(on_complete)) {
                return false;
            }
            log::debug!(
                "Spinning {:.0} degrees over {:.2}s",
                plan.total_rotation,
                plan.duration.as_secs_f64()
            );
        }

        let weak = Rc::downgrade(&self.inner);
        let id = self.area.add_tick_callback(move |area, _| {
            let Some(inner) = weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let outcome = inner.borrow_mut().advance(Instant::now());
            match outcome {
                TickOutcome::Running => {
                    area.queue_draw();
                    glib::ControlFlow::Continue
                }
                TickOutcome::Finished(result) => {
                    area.queue_draw();
                    if let Some((winner, on_complete)) = result {
                        on_complete(winner);
                    }
                    glib::ControlFlow::Break
                }
                TickOutcome::Idle => glib::ControlFlow::Break,
            }
        });
        self.inner.borrow_mut().tick = Some(id);
        true
    }

    pub fn show_result_overlay(&self, title: &str, message: &str, color: Srgb<u8>) {
        self.inner.borrow_mut().overlay = Some(ResultCard::new(title, message, color));
        self.area.queue_draw();
    }

    pub fn hide_result_overlay(&self) {
        if self.inner.borrow_mut().overlay.take().is_some() {
            self.area.queue_draw();
        }
    }

    /// Stops a running spin without reporting a winner.
    pub fn cancel(&self) {
        self.inner.borrow_mut().cancel();
    }
}

impl Drop for WheelWidget {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn inner(entries: Vec<Entry>) -> Inner {
        let viewport = Viewport::new(100, 100);
        let mut state = WheelState::new(viewport);
        state.set_entries(entries);
        Inner {
            state,
            renderer: WheelRenderer::new(viewport, "Sans"),
            animator: Animator::default(),
            settings: SpinSettings::default(),
            quality: Quality::High,
            overlay: None,
            tick: None,
            on_complete: None,
        }
    }

    fn two_entries() -> Vec<Entry> {
        vec![Entry::new("A", 1.0), Entry::new("B", 1.0)]
    }

    fn plan(start_angle: f64, total_rotation: f64) -> SpinPlan {
        SpinPlan {
            start_angle,
            total_rotation,
            duration: Duration::from_secs(1),
        }
    }

    fn counting(calls: &Rc<Cell<u32>>) -> SpinCallback {
        let calls = calls.clone();
        Box::new(move |_| calls.set(calls.get() + 1))
    }

    #[test]
    fn test_completion_fires_once_with_winner() {
        let t0 = Instant::now();
        let calls = Rc::new(Cell::new(0));
        let mut wheel = inner(two_entries());
        assert!(wheel.begin(plan(0.0, 725.0), t0, counting(&calls)));

        assert!(matches!(
            wheel.advance(t0 + Duration::from_millis(500)),
            TickOutcome::Running
        ));
        assert_eq!(wheel.quality, Quality::Fast);

        let TickOutcome::Finished(Some((winner, on_complete))) =
            wheel.advance(t0 + Duration::from_secs(1))
        else {
            panic!("spin should finish with a winner");
        };
        assert_eq!(winner.label, "A");
        assert_eq!(wheel.state.angle, 5.0);
        assert_eq!(wheel.quality, Quality::High);
        on_complete(winner);
        assert_eq!(calls.get(), 1);

        for secs in [2, 3] {
            assert!(matches!(
                wheel.advance(t0 + Duration::from_secs(secs)),
                TickOutcome::Idle
            ));
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(Rc::strong_count(&calls), 1);
    }

    #[test]
    fn test_second_spin_keeps_first_callback() {
        let t0 = Instant::now();
        let (first, second) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
        let mut wheel = inner(two_entries());
        assert!(wheel.begin(plan(0.0, 725.0), t0, counting(&first)));
        assert!(!wheel.begin(plan(0.0, 900.0), t0, counting(&second)));
        assert_eq!(Rc::strong_count(&second), 1);

        let TickOutcome::Finished(Some((winner, on_complete))) =
            wheel.advance(t0 + Duration::from_secs(1))
        else {
            panic!("spin should finish with a winner");
        };
        on_complete(winner);
        assert_eq!((first.get(), second.get()), (1, 0));
    }

    #[test]
    fn test_cancel_releases_callback() {
        let t0 = Instant::now();
        let calls = Rc::new(Cell::new(0));
        let mut wheel = inner(two_entries());
        assert!(wheel.begin(plan(30.0, 720.0), t0, counting(&calls)));
        assert!(matches!(
            wheel.advance(t0 + Duration::from_millis(200)),
            TickOutcome::Running
        ));

        wheel.cancel();
        assert!(wheel.on_complete.is_none());
        assert_eq!(Rc::strong_count(&calls), 1);
        assert!(!wheel.animator.is_spinning());
        assert_eq!(wheel.quality, Quality::High);

        assert!(matches!(
            wheel.advance(t0 + Duration::from_secs(5)),
            TickOutcome::Idle
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_begin_refused_without_entries() {
        let calls = Rc::new(Cell::new(0));
        let mut wheel = inner(vec![Entry::new("zero", 0.0)]);
        assert!(!wheel.begin(plan(0.0, 720.0), Instant::now(), counting(&calls)));
        assert!(wheel.on_complete.is_none());
        assert!(!wheel.animator.is_spinning());
    }
}
