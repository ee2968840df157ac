use taixiu_execution::{Notice, PresentationPort, Settlement, Snapshot};
use taixiu_types::{Dice, RoundRecord};
use tokio::sync::mpsc;

/// Messages from the table to the render loop.
#[derive(Debug, Clone)]
pub enum UiEvent {
    State(Snapshot),
    Tick(Dice),
    Settled(Box<Settlement>),
    History(Vec<RoundRecord>),
    Notice(Notice),
}

/// Forwards controller output onto the UI channel.
pub struct ChannelPort {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelPort {
    pub fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: UiEvent) {
        // Receiver gone means the UI is shutting down.
        let _ = self.tx.send(event);
    }
}

impl PresentationPort for ChannelPort {
    fn on_state(&mut self, snapshot: Snapshot) {
        self.send(UiEvent::State(snapshot));
    }

    fn on_tick(&mut self, dice: Dice) {
        self.send(UiEvent::Tick(dice));
    }

    fn on_settled(&mut self, settlement: &Settlement) {
        self.send(UiEvent::Settled(Box::new(settlement.clone())));
    }

    fn on_history(&mut self, history: &[RoundRecord]) {
        self.send(UiEvent::History(history.to_vec()));
    }

    fn on_notice(&mut self, notice: Notice) {
        self.send(UiEvent::Notice(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taixiu_execution::{GameRng, MemoryStore, PersistenceGateway, RoundController, TableConfig};
    use taixiu_types::Side;

    #[test]
    fn test_channel_port_forwards_round() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut table = RoundController::new(
            TableConfig::default(),
            PersistenceGateway::new(MemoryStore::default()),
            ChannelPort::new(tx),
            GameRng::from_seed(3),
        );
        table.select_side(Side::Small).unwrap();
        table.roll(0).unwrap();
        table.advance(2_000);

        let mut ticks = 0;
        let mut settled = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                UiEvent::Tick(_) => ticks += 1,
                UiEvent::Settled(s) => settled = Some(s),
                _ => {}
            }
        }
        assert!(ticks > 0);
        let settled = settled.expect("settlement forwarded");
        assert_eq!(settled.record.bet_side, Side::Small);
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut port = ChannelPort::new(tx);
        port.on_notice(Notice::info("nobody listening"));
    }
}
