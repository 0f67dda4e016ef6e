//! The event loop. Events arrive one at a time and are processed to
//! quiescence before the next is read; there is no other mutator of the
//! tree or the directory, so the core needs no locking.

use crate::events::Event;
use crate::report;
use hexgrid::Point;
use log::{info, warn};
use septa::phone::{PhoneDirectory, PhoneIndex};
use septa::{RaTree, SearchOutcome, SeptaError, SeptaResult};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Whether the loop keeps going after an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    ///
    Continue,
    ///
    Quit,
}

/// The interactive shell state: the tree, the phones, the currently
/// selected caller and the (view-only) depth.
pub struct Shell {
    tree: RaTree,
    phones: PhoneDirectory,
    selected: Option<PhoneIndex>,
    view_depth: usize,
    move_step: f64,
}

impl Shell {
    /// Wraps an already-populated tree and directory.
    pub fn new(tree: RaTree, phones: PhoneDirectory, move_step: f64) -> Shell {
        let view_depth = tree.parameters().levels.saturating_sub(1);
        Shell {
            tree,
            phones,
            selected: None,
            view_depth,
            move_step,
        }
    }

    ///
    pub fn tree(&self) -> &RaTree {
        &self.tree
    }

    ///
    pub fn phones(&self) -> &PhoneDirectory {
        &self.phones
    }

    ///
    pub fn selected(&self) -> Option<PhoneIndex> {
        self.selected
    }

    ///
    pub fn view_depth(&self) -> usize {
        self.view_depth
    }

    /// Applies one event to the core. Unknown phone ids are reported and
    /// ignored; everything else propagates.
    pub fn handle(&mut self, event: Event) -> SeptaResult<Flow> {
        match event {
            Event::Quit => return Ok(Flow::Quit),
            Event::SetDepth(depth) => {
                self.view_depth = depth.min(self.tree.parameters().levels.saturating_sub(1));
                info!("viewing depth {}", self.view_depth);
            }
            Event::Select(id) => match self.phones.index_of(&id) {
                Ok(p) => {
                    info!("selected phone {}", id);
                    self.selected = Some(p);
                }
                Err(e) => warn!("{}", e),
            },
            Event::Move { phone, dx, dy } => match self.phones.index_of(&phone) {
                Ok(p) => self.move_phone(p, dx, dy)?,
                Err(e) => warn!("{}", e),
            },
            Event::Call(callee) => match self.phones.index_of(&callee) {
                Ok(callee) => self.place_call(callee)?,
                Err(e) => warn!("{}", e),
            },
        }
        Ok(Flow::Continue)
    }

    fn move_phone(&mut self, p: PhoneIndex, dx: i8, dy: i8) -> SeptaResult<()> {
        let position = self.phones.phone(p).position();
        let next = Point::new(
            position.x + f64::from(dx) * self.move_step,
            position.y + f64::from(dy) * self.move_step,
        );
        self.phones.set_position(p, next);
        if self.tree.has_moved_to_new_cell(&self.phones, p) {
            self.tree.update_location(&mut self.phones, p)?;
        }
        Ok(())
    }

    fn place_call(&mut self, callee: PhoneIndex) -> SeptaResult<()> {
        let caller = match self.selected {
            Some(caller) => caller,
            None => {
                warn!("no phone selected; ignoring the call");
                return Ok(());
            }
        };
        match self.tree.call(&mut self.phones, caller, callee) {
            Ok(SearchOutcome::Connected(leaf)) => info!("call connected at {}", leaf),
            Ok(SearchOutcome::Voicemail) => info!("callee unreachable, voicemail"),
            Err(SeptaError::OutOfCoverage(id)) => {
                warn!("caller {} is out of coverage; no call placed", id)
            }
            Err(e) => return Err(e),
        }
        self.print_counters();
        Ok(())
    }

    /// Cumulative per-phone counters, dumped after every call.
    fn print_counters(&self) {
        for phone in self.phones.iter() {
            println!(
                "{}: {} searches, {} updates",
                phone.id(),
                phone.num_reads(),
                phone.num_writes()
            );
        }
    }

    /// Drains the event stream until `quit` or end of input, then writes
    /// the report into `report_dir`.
    pub fn run<R: BufRead>(&mut self, input: R, report_dir: &Path) -> SeptaResult<PathBuf> {
        for line in input.lines() {
            let line = line.map_err(SeptaError::from)?;
            match Event::parse(&line) {
                Ok(Some(event)) => {
                    if self.handle(event)? == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("skipping: {}", e),
            }
        }
        self.finish(report_dir)
    }

    /// Writes the aggregate report; the exit path for every way the loop
    /// can end.
    pub fn finish(&self, report_dir: &Path) -> SeptaResult<PathBuf> {
        let path = report::write_report(report_dir, self.tree.policy(), &self.phones)?;
        info!("wrote results to {}", path.display());
        Ok(path)
    }
}
