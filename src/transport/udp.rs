// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use log::debug;

use super::{Error, Transport};
use crate::message::{Message, Reader};

/// The size of the receive buffer. This comfortably exceeds the UDP
/// payload size the resolver advertises.
const RECEIVE_BUFFER_SIZE: usize = 4096;

/// A [`Transport`] over UDP using the Rust standard library.
///
/// One ephemeral socket is bound per address family, the first time a
/// server of that family is queried, and reused afterward. Datagrams
/// that do not come from the queried server, or that are not a
/// response with the query's ID, are discarded.
#[derive(Debug, Default)]
pub struct UdpTransport {
    v4: Option<UdpSocket>,
    v6: Option<UdpSocket>,
}

impl UdpTransport {
    /// Creates a new `UdpTransport`. No sockets are bound until the
    /// first query.
    pub fn new() -> Self {
        Self::default()
    }

    fn socket_for(&mut self, server: SocketAddr) -> Result<&UdpSocket, Error> {
        let (slot, local) = match server {
            SocketAddr::V4(_) => (&mut self.v4, SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))),
            SocketAddr::V6(_) => (&mut self.v6, SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))),
        };
        let socket = match slot.take() {
            Some(socket) => socket,
            None => UdpSocket::bind(local)?,
        };
        Ok(slot.insert(socket))
    }
}

impl Transport for UdpTransport {
    fn query(
        &mut self,
        query: &Message,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Message, Error> {
        let deadline = Instant::now() + timeout;
        let octets = query.to_wire()?;
        let socket = self.socket_for(server)?;
        socket.send_to(&octets, server)?;

        let mut buf = [0; RECEIVE_BUFFER_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            socket.set_read_timeout(Some(remaining))?;
            let (len, source) = socket.recv_from(&mut buf)?;
            let received = &buf[..len];

            if source != server {
                debug!("Discarding datagram from unexpected source {}", source);
                continue;
            }
            match Reader::try_from(received) {
                Ok(reader) if reader.qr() && reader.id() == query.id => {
                    return Message::from_wire(received).map_err(Into::into);
                }
                _ => debug!("Discarding unrelated datagram from {}", source),
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::{Class, Rdata, Rrset, Type};
    use std::thread;

    fn local_server() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    #[test]
    fn udp_transport_round_trips() {
        let (server, addr) = local_server();
        let handle = thread::spawn(move || {
            let mut buf = [0; 512];
            let (len, client) = server.recv_from(&mut buf).unwrap();
            let query = Message::from_wire(&buf[..len]).unwrap();

            // A stray datagram with the wrong ID comes first.
            let mut stray = Message::response_to(&query);
            stray.id = query.id.wrapping_add(1);
            server.send_to(&stray.to_wire().unwrap(), client).unwrap();

            let mut response = Message::response_to(&query);
            response.aa = true;
            let mut rrset = Rrset::new(query.question[0].qname.clone(), Type::A, Class::IN, 60);
            rrset.push_rdata(Rdata::A(Ipv4Addr::new(192, 0, 2, 53)));
            response.answer.push(rrset);
            server.send_to(&response.to_wire().unwrap(), client).unwrap();
        });

        let query = Message::query(0xbeef, "quarry.test.".parse().unwrap(), Type::A, true);
        let mut transport = UdpTransport::new();
        let response = transport
            .query(&query, addr, Duration::from_secs(5))
            .unwrap();
        handle.join().unwrap();

        assert_eq!(response.id, 0xbeef);
        assert!(response.qr && response.aa);
        assert_eq!(response.answer[0].rdatas, [Rdata::A(Ipv4Addr::new(192, 0, 2, 53))]);
    }

    #[test]
    fn udp_transport_times_out() {
        let (_server, addr) = local_server();
        let query = Message::query(1, "quarry.test.".parse().unwrap(), Type::A, false);
        let mut transport = UdpTransport::new();
        let start = Instant::now();
        assert_eq!(
            transport.query(&query, addr, Duration::from_millis(200)),
            Err(Error::Timeout)
        );
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
