//! Text rendered into client and fabric display buffers.

use std::fmt::Write;

use crate::ClientHandle;
use crate::DisplayBuffer;
use crate::NodeId;
use crate::Usecase;

/// One path of a client's current vote, as emitted by the client dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVoteStatus {
    pub name: String,
    pub src: NodeId,
    pub dst: NodeId,
    pub ab: u64,
    pub ib: u64,
    pub active_only: bool,
    pub vote_count: u64,
}

/// One node's aggregated vote in a fabric commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitVote {
    pub node_id: NodeId,
    pub ab: u64,
    pub ib: u64,
}

impl CommitVote {
    pub fn new(
        node_id: NodeId,
        ab: u64,
        ib: u64,
    ) -> Self {
        Self { node_id, ab, ib }
    }
}

// Writes into a DisplayBuffer truncate instead of failing.

pub(crate) fn client_transaction(
    buffer: &mut DisplayBuffer,
    stamp: &str,
    index: u32,
    usecase: &Usecase,
) {
    buffer.begin_record();
    let _ = write!(buffer, "\n{stamp}\ncurr   : {index:8}\nmasters:");
    for v in &usecase.vectors {
        let _ = write!(buffer, " {:5}", v.src);
    }
    let _ = write!(buffer, "\nslaves :");
    for v in &usecase.vectors {
        let _ = write!(buffer, " {:5}", v.dst);
    }
    let _ = write!(buffer, "\nab     :");
    for v in &usecase.vectors {
        let _ = write!(buffer, " {:8}", v.ab);
    }
    let _ = write!(buffer, "\nib     :");
    for v in &usecase.vectors {
        let _ = write!(buffer, " {:8}", v.ib);
    }
    let _ = writeln!(buffer);
}

pub(crate) fn handle_transaction(
    buffer: &mut DisplayBuffer,
    stamp: &str,
    handle: &ClientHandle,
    ab: u64,
    ib: u64,
) {
    buffer.begin_record();
    let _ = write!(
        buffer,
        "\n{stamp}\nmaster: {:5}\nslave : {:5}\nab     : {ab:8}\nib     : {ib:8}\n",
        handle.master(),
        handle.slave(),
    );
}

pub(crate) fn fabric_commit(
    buffer: &mut DisplayBuffer,
    stamp: &str,
    votes: &[CommitVote],
) {
    buffer.begin_record();
    let _ = writeln!(buffer, "\n{stamp}");
    for vote in votes {
        let _ = writeln!(
            buffer,
            "node   : {:5}  ab: {:12}  ib: {:12}",
            vote.node_id, vote.ab, vote.ib
        );
    }
}
