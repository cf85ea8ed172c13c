use std::net::{SocketAddr, TcpListener};

pub fn get_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// Loopback address on a port nothing is listening on yet.
pub fn local_addr() -> std::io::Result<SocketAddr> {
    Ok(SocketAddr::from(([127, 0, 0, 1], get_available_port()?)))
}
