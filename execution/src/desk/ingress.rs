use super::{DeskError, WagerReceipt};
use futures::{
    channel::{mpsc, oneshot},
    SinkExt,
};
use spacerace_types::{JackpotState, Leaderboard, PlayerId, PlayerProgress, PoolState, RaceResult};
use tracing::warn;

/// Messages sent to the desk.
pub enum Message {
    PlaceWager {
        player: PlayerId,
        ship_id: u8,
        amount: u64,
        entropy: Vec<u8>,
        response: oneshot::Sender<Result<WagerReceipt, DeskError>>,
    },
    SimulateDebug {
        entropy: Vec<u8>,
        response: oneshot::Sender<RaceResult>,
    },
    Progress {
        player: PlayerId,
        response: oneshot::Sender<Option<PlayerProgress>>,
    },
    Jackpots {
        response: oneshot::Sender<JackpotState>,
    },
    Pool {
        response: oneshot::Sender<PoolState>,
    },
    Leaderboard {
        response: oneshot::Sender<Leaderboard>,
    },
}

/// Mailbox for the desk.
#[derive(Clone)]
pub struct Mailbox {
    sender: mpsc::Sender<Message>,
}

impl Mailbox {
    pub(super) fn new(sender: mpsc::Sender<Message>) -> Self {
        Self { sender }
    }

    pub async fn place_wager(
        &mut self,
        player: PlayerId,
        ship_id: u8,
        amount: u64,
        entropy: Vec<u8>,
    ) -> Result<WagerReceipt, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(
            Message::PlaceWager {
                player,
                ship_id,
                amount,
                entropy,
                response,
            },
            "place_wager",
        )
        .await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)?
    }

    pub async fn simulate_debug(&mut self, entropy: Vec<u8>) -> Result<RaceResult, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::SimulateDebug { entropy, response }, "simulate_debug")
            .await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)
    }

    pub async fn progress(
        &mut self,
        player: PlayerId,
    ) -> Result<Option<PlayerProgress>, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::Progress { player, response }, "progress")
            .await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)
    }

    pub async fn jackpots(&mut self) -> Result<JackpotState, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::Jackpots { response }, "jackpots").await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)
    }

    pub async fn pool(&mut self) -> Result<PoolState, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::Pool { response }, "pool").await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)
    }

    pub async fn leaderboard(&mut self) -> Result<Leaderboard, DeskError> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::Leaderboard { response }, "leaderboard")
            .await?;
        receiver.await.map_err(|_| DeskError::MailboxClosed)
    }

    async fn send(&mut self, message: Message, kind: &'static str) -> Result<(), DeskError> {
        if self.sender.send(message).await.is_err() {
            warn!(kind, "desk mailbox closed; request dropped");
            return Err(DeskError::MailboxClosed);
        }
        Ok(())
    }
}
