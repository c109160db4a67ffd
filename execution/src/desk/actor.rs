use super::{
    ingress::{Mailbox, Message},
    Desk, UnlockSink,
};
use futures::{channel::mpsc, StreamExt};
use tracing::{debug, warn};

/// Serializes requests from every [Mailbox] onto one [Desk].
pub struct Actor<S: UnlockSink> {
    desk: Desk<S>,
    mailbox: mpsc::Receiver<Message>,
}

impl<S: UnlockSink> Actor<S> {
    pub fn new(desk: Desk<S>, mailbox_size: usize) -> (Self, Mailbox) {
        let (sender, mailbox) = mpsc::channel(mailbox_size);
        (Self { desk, mailbox }, Mailbox::new(sender))
    }

    /// Process requests until every [Mailbox] has been dropped, then hand back the desk.
    ///
    /// Each request runs to completion before the next is read.
    pub async fn run(mut self) -> Desk<S> {
        while let Some(message) = self.mailbox.next().await {
            match message {
                Message::PlaceWager {
                    player,
                    ship_id,
                    amount,
                    entropy,
                    response,
                } => {
                    let result = self.desk.place_wager(player, ship_id, amount, &entropy);
                    if response.send(result).is_err() {
                        warn!("place_wager caller went away; result dropped");
                    }
                }
                Message::SimulateDebug { entropy, response } => {
                    let _ = response.send(self.desk.simulate_debug(&entropy));
                }
                Message::Progress { player, response } => {
                    let _ = response.send(self.desk.get_player_progress(&player).cloned());
                }
                Message::Jackpots { response } => {
                    let _ = response.send(self.desk.get_jackpot_amounts());
                }
                Message::Pool { response } => {
                    let _ = response.send(self.desk.pool().clone());
                }
                Message::Leaderboard { response } => {
                    let _ = response.send(self.desk.leaderboard().clone());
                }
            }
        }
        debug!(races = self.desk.next_race_id(), "desk mailbox closed; shutting down");
        self.desk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, desk::DeskError, mocks::create_player};
    use futures::future::join_all;

    #[tokio::test]
    async fn test_concurrent_wagers_are_serialized() {
        let config = EngineConfig::default().validate().unwrap();
        let (actor, mailbox) = Actor::new(Desk::new(&config), config.mailbox_size);
        let handle = tokio::spawn(actor.run());

        let wagers = (0..16u64).map(|i| {
            let mut mailbox = mailbox.clone();
            async move {
                mailbox
                    .place_wager(create_player(i), (i % 8) as u8, 100, i.to_be_bytes().to_vec())
                    .await
                    .unwrap()
            }
        });
        let receipts = join_all(wagers).await;

        let mut race_ids: Vec<u64> = receipts.iter().map(|r| r.race.race_id).collect();
        race_ids.sort_unstable();
        assert_eq!(race_ids, (0..16).collect::<Vec<_>>());

        let mut query = mailbox.clone();
        let pool = query.pool().await.unwrap();
        assert_eq!(pool.races_settled, 16);
        let leaderboard = query.leaderboard().await.unwrap();
        assert!(leaderboard.entries.len() <= 10);
        let progress = query.progress(create_player(3)).await.unwrap().unwrap();
        assert_eq!(progress.races, 1);
        assert_eq!(query.jackpots().await.unwrap(), pool.jackpots);

        drop(query);
        drop(mailbox);
        let desk = handle.await.unwrap();
        assert_eq!(desk.next_race_id(), 16);
    }

    #[tokio::test]
    async fn test_rejections_and_debug_races_pass_through() {
        let config = EngineConfig::default().validate().unwrap();
        let (actor, mut mailbox) = Actor::new(Desk::new(&config), 4);
        let handle = tokio::spawn(actor.run());

        let err = mailbox
            .place_wager(create_player(1), 0, 1, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Settlement(_)));

        let race = mailbox.simulate_debug(b"debug".to_vec()).await.unwrap();
        assert_eq!(race, crate::race::simulate_debug(b"debug"));

        drop(mailbox);
        let desk = handle.await.unwrap();
        assert_eq!(desk.next_race_id(), 0);
    }

    #[tokio::test]
    async fn test_closed_desk_reports_error() {
        let config = EngineConfig::default().validate().unwrap();
        let (actor, mut mailbox) = Actor::new(Desk::new(&config), 1);
        drop(actor);
        let err = mailbox.jackpots().await.unwrap_err();
        assert!(matches!(err, DeskError::MailboxClosed));
        assert!(!err.is_fatal());
    }
}
