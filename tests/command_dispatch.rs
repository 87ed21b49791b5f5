//! Integration tests for command dispatch over a live connection.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chatcore::{ChatClient, CommandSpec, ConnectionState, HandlerError};
use common::{FakeServer, ServerConn, tick_until};

async fn connected(server: &FakeServer) -> (ChatClient, ServerConn) {
    let mut client = ChatClient::new(&server.config());
    client.connect(FakeServer::credentials()).expect("connect");
    let mut conn = server.accept().await.expect("accept");
    assert!(tick_until(&mut client, |c| c.state() == ConnectionState::Connected).await);
    conn.handshake().await.expect("handshake");
    (client, conn)
}

#[tokio::test]
async fn test_command_reply_reaches_server() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    client
        .register_command(
            CommandSpec::new("give", |ctx| {
                let (Some(user), Some(item)) = (ctx.arg(0), ctx.arg(1)) else {
                    return Err(HandlerError::NeedMoreParams);
                };
                let reply = format!("{} gave {user} {item}", ctx.sender);
                ctx.reply(reply);
                Ok(())
            })
            .requires_args(true),
        )
        .expect("register");

    conn.send(r#":streamer!streamer@host PRIVMSG #chan :!give alice "500 gems""#)
        .await
        .expect("send");
    let reply = conn.recv_while_ticking(&mut client).await.expect("reply");
    assert_eq!(reply, "PRIVMSG #chan :streamer gave alice 500 gems");
}

#[tokio::test]
async fn test_threaded_reply_carries_parent_id() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    client
        .register_command(CommandSpec::new("ping", |ctx| {
            ctx.reply_threaded("pong");
            Ok(())
        }))
        .expect("register");

    conn.send("@id=abc-123;color=#00FF00 :viewer!viewer@host PRIVMSG #chan :!ping")
        .await
        .expect("send");
    let reply = conn.recv_while_ticking(&mut client).await.expect("reply");
    assert_eq!(reply, "@reply-parent-msg-id=abc-123 PRIVMSG #chan :pong");
}

#[tokio::test]
async fn test_role_gate_uses_badges() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    let runs = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&runs);
    client
        .register_command(
            CommandSpec::new("clear", move |ctx| {
                sink.borrow_mut().push(ctx.sender.to_owned());
                ctx.reply("cleared");
                Ok(())
            })
            .allowed_roles(["moderator"]),
        )
        .expect("register");

    conn.send("@badges=subscriber/6 :viewer!viewer@host PRIVMSG #chan :!clear")
        .await
        .expect("send");
    conn.send("@badges=moderator/1,subscriber/12 :mod!mod@host PRIVMSG #chan :!clear")
        .await
        .expect("send");

    let reply = conn.recv_while_ticking(&mut client).await.expect("reply");
    assert_eq!(reply, "PRIVMSG #chan :cleared");
    assert_eq!(*runs.borrow(), ["mod"]);
}

#[tokio::test]
async fn test_subscriber_and_command_share_outbox() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    client.subscribe(|msg, outbox| {
        if msg.is_action {
            outbox.say(format!("{} waves back", msg.sender));
        }
    });

    conn.send(":alice!alice@host PRIVMSG #chan :\u{1}ACTION waves\u{1}")
        .await
        .expect("send");
    let reply = conn.recv_while_ticking(&mut client).await.expect("reply");
    assert_eq!(reply, "PRIVMSG #chan :alice waves back");
}

#[tokio::test]
async fn test_failing_handler_keeps_connection() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    client
        .register_command(CommandSpec::new("boom", |_| panic!("handler bug")))
        .expect("register");
    client
        .register_command(CommandSpec::new("ok", |ctx| {
            ctx.reply("still here");
            Ok(())
        }))
        .expect("register");

    conn.send(":alice!alice@host PRIVMSG #chan :!boom").await.expect("send");
    conn.send(":alice!alice@host PRIVMSG #chan :!ok").await.expect("send");
    let reply = conn.recv_while_ticking(&mut client).await.expect("reply");
    assert_eq!(reply, "PRIVMSG #chan :still here");
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_timer_sends_message() {
    let server = FakeServer::bind().await.expect("bind");
    let (mut client, mut conn) = connected(&server).await;
    client.run_after(std::time::Duration::from_millis(20), |client| {
        client.send_message("scheduled").expect("send");
    });

    let line = conn.recv_while_ticking(&mut client).await.expect("line");
    assert_eq!(line, "PRIVMSG #chan :scheduled");
}
